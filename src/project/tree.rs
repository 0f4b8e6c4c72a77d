//! Folder view over flat file paths.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Folder { name: String, children: Vec<TreeNode> },
    File { name: String, path: String },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Builds the folder tree implied by `/` prefixes, keeping first-seen order.
pub fn build<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    for path in paths {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            continue;
        }
        insert(&mut roots, &segments, path);
    }
    roots
}

fn insert(nodes: &mut Vec<TreeNode>, segments: &[&str], path: &str) {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return,
    };

    if rest.is_empty() {
        nodes.push(TreeNode::File {
            name: (*head).to_string(),
            path: path.to_string(),
        });
        return;
    }

    let existing = nodes.iter_mut().find_map(|node| match node {
        TreeNode::Folder { name, children } if name.as_str() == *head => Some(children),
        _ => None,
    });

    match existing {
        Some(children) => insert(children, rest, path),
        None => {
            let mut children = Vec::new();
            insert(&mut children, rest, path);
            nodes.push(TreeNode::Folder {
                name: (*head).to_string(),
                children,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{build, TreeNode};

    fn file(name: &str, path: &str) -> TreeNode {
        TreeNode::File {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn flat_paths_stay_flat() {
        let tree = build(["index.html", "style.css"]);
        assert_eq!(
            tree,
            vec![file("index.html", "index.html"), file("style.css", "style.css")]
        );
    }

    #[test]
    fn prefixes_group_into_folders_in_first_seen_order() {
        let tree = build([
            "index.html",
            "css/theme.css",
            "js/app.js",
            "css/print.css",
            "css/vendor/reset.css",
        ]);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].name(), "index.html");
        let TreeNode::Folder { name, children } = &tree[1] else {
            panic!("css should be a folder");
        };
        assert_eq!(name, "css");
        let names: Vec<&str> = children.iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["theme.css", "print.css", "vendor"]);
        assert_eq!(tree[2].name(), "js");
    }
}
