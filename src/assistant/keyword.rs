use crate::assistant::{FileEdit, Reply, Responder, ResponderError};
use crate::project::{FileStore, INDEX_HTML, SCRIPT_JS, STYLE_CSS};

const FALLBACK_FIND: &str = "<h1>Welcome to the AI Website Builder</h1>";
const FALLBACK_WITH: &str = "<h1>Welcome to Your AI-Powered Website</h1>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Header,
    Color,
    Gallery,
    Portfolio,
    Contact,
}

impl RuleKind {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Header => &["header", "navbar", "navigation"],
            Self::Color => &["color", "colour", "theme", "palette"],
            Self::Gallery => &["gallery", "photo", "image"],
            Self::Portfolio => &["portfolio", "project"],
            Self::Contact => &["contact", "form", "email"],
        }
    }

    /// Text present in `index.html` or `style.css` once the rule has run.
    fn marker(self) -> &'static str {
        match self {
            Self::Header => "id=\"site-header\"",
            Self::Color => "/* palette */",
            Self::Gallery => "id=\"gallery\"",
            Self::Portfolio => "id=\"portfolio\"",
            Self::Contact => "id=\"contact\"",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Self::Header => "a header with site navigation",
            Self::Color => "a new colour palette",
            Self::Gallery => "an image gallery section",
            Self::Portfolio => "a filterable portfolio section",
            Self::Contact => "a contact form",
        }
    }

    fn edits(self) -> Vec<FileEdit> {
        match self {
            Self::Header => vec![
                FileEdit::InsertAfter {
                    path: INDEX_HTML,
                    anchor: "<body>",
                    text: "\n  <header id=\"site-header\">\n    <nav>\n      <a href=\"#\">Home</a>\n      <a href=\"#about\">About</a>\n      <a href=\"#contact\">Contact</a>\n    </nav>\n  </header>".to_string(),
                },
                FileEdit::Append {
                    path: STYLE_CSS,
                    text: "#site-header { background: #1e293b; padding: 16px 20px; margin: -20px -20px 20px; }\n#site-header nav a { color: #f8fafc; margin-right: 16px; text-decoration: none; }\n".to_string(),
                },
            ],
            Self::Color => vec![FileEdit::Append {
                path: STYLE_CSS,
                text: "/* palette */\nbody { background: #0f172a; color: #e2e8f0; }\nh1, h2 { color: #38bdf8; }\na { color: #f472b6; }\n".to_string(),
            }],
            Self::Gallery => vec![
                FileEdit::InsertBefore {
                    path: INDEX_HTML,
                    anchor: "</body>",
                    text: "  <section id=\"gallery\">\n    <h2>Gallery</h2>\n    <div class=\"grid\">\n      <img src=\"https://picsum.photos/seed/1/400/300\" alt=\"Photo 1\" />\n      <img src=\"https://picsum.photos/seed/2/400/300\" alt=\"Photo 2\" />\n      <img src=\"https://picsum.photos/seed/3/400/300\" alt=\"Photo 3\" />\n    </div>\n  </section>\n".to_string(),
                },
                FileEdit::Append {
                    path: STYLE_CSS,
                    text: "#gallery .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 12px; }\n#gallery img { width: 100%; border-radius: 8px; }\n".to_string(),
                },
            ],
            Self::Portfolio => vec![
                FileEdit::InsertBefore {
                    path: INDEX_HTML,
                    anchor: "</body>",
                    text: "  <section id=\"portfolio\">\n    <h2>Portfolio</h2>\n    <div class=\"filters\">\n      <button data-filter=\"all\">All</button>\n      <button data-filter=\"web\">Web</button>\n      <button data-filter=\"design\">Design</button>\n    </div>\n    <article class=\"card\" data-tag=\"web\"><h3>Storefront</h3><p>Responsive shop front.</p></article>\n    <article class=\"card\" data-tag=\"design\"><h3>Brand kit</h3><p>Logo and type system.</p></article>\n  </section>\n".to_string(),
                },
                FileEdit::Append {
                    path: STYLE_CSS,
                    text: "#portfolio .card { border: 1px solid #cbd5e1; border-radius: 8px; padding: 12px; margin: 8px 0; }\n#portfolio .filters button { margin-right: 8px; }\n".to_string(),
                },
                FileEdit::Append {
                    path: SCRIPT_JS,
                    text: "document.querySelectorAll('#portfolio [data-filter]').forEach((button) => {\n  button.addEventListener('click', () => {\n    const filter = button.dataset.filter;\n    document.querySelectorAll('#portfolio .card').forEach((card) => {\n      card.hidden = filter !== 'all' && card.dataset.tag !== filter;\n    });\n  });\n});\n".to_string(),
                },
            ],
            Self::Contact => vec![
                FileEdit::InsertBefore {
                    path: INDEX_HTML,
                    anchor: "</body>",
                    text: "  <section id=\"contact\">\n    <h2>Contact</h2>\n    <form id=\"contact-form\">\n      <input name=\"email\" type=\"email\" placeholder=\"you@example.com\" required />\n      <textarea name=\"message\" placeholder=\"Your message\"></textarea>\n      <button type=\"submit\">Send</button>\n    </form>\n    <p id=\"contact-status\"></p>\n  </section>\n".to_string(),
                },
                FileEdit::Append {
                    path: SCRIPT_JS,
                    text: "document.getElementById('contact-form')?.addEventListener('submit', (event) => {\n  event.preventDefault();\n  document.getElementById('contact-status').textContent = 'Thanks! We will be in touch.';\n});\n".to_string(),
                },
            ],
        }
    }
}

/// Ordered keyword table; the first rule with a matching keyword wins.
pub const RULE_ORDER: [RuleKind; 5] = [
    RuleKind::Header,
    RuleKind::Color,
    RuleKind::Gallery,
    RuleKind::Portfolio,
    RuleKind::Contact,
];

pub fn match_rule(message: &str) -> Option<RuleKind> {
    let lowered = message.to_lowercase();
    RULE_ORDER.into_iter().find(|rule| {
        rule.keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword))
    })
}

/// Canned responder driven by case-insensitive keyword checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn new() -> Self {
        Self
    }
}

impl Responder for KeywordResponder {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn respond(&self, message: &str, files: &FileStore) -> Result<Reply, ResponderError> {
        let mut next = files.clone();

        let Some(rule) = match_rule(message) else {
            FileEdit::Replace {
                path: INDEX_HTML,
                find: FALLBACK_FIND,
                with: FALLBACK_WITH.to_string(),
            }
            .apply(&mut next);
            return Ok(Reply {
                text: compose_reply("update the page heading"),
                files: next,
            });
        };

        let already_applied = [INDEX_HTML, STYLE_CSS]
            .iter()
            .any(|path| files.get_or_empty(path).contains(rule.marker()));
        if already_applied {
            return Ok(Reply {
                text: format!(
                    "Your site already has {}. Try asking for something else, like a gallery or a contact form.",
                    rule.summary()
                ),
                files: next,
            });
        }

        for edit in rule.edits() {
            edit.apply(&mut next);
        }

        Ok(Reply {
            text: compose_reply(&format!("add {}", rule.summary())),
            files: next,
        })
    }
}

fn compose_reply(change: &str) -> String {
    format!(
        "I've received your request. Here's what I can do:\n\n\
         1. First I'll analyze what you're asking for\n\
         2. Then I'll {change} in your HTML, CSS, and JavaScript files\n\
         [Code Hidden]\n\n\
         I've updated your website based on your request. Check the preview tab to see the changes!"
    )
}
