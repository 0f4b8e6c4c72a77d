use crate::chat::Author;
use crate::project::FileKind;
use crate::studio::NoticeLevel;
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub tab_bar: Color32,
    pub panel: Color32,
    pub sidebar: Color32,
    pub editor: Color32,
    pub border: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub user_bubble: Color32,
    pub assistant_bubble: Color32,
    pub danger: Color32,
    pub success: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub radius: u8,
    pub spacing: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            tab_bar: Color32::from_rgb(0x1E, 0x1E, 0x2E),
            panel: Color32::from_rgb(0x25, 0x25, 0x38),
            sidebar: Color32::from_rgb(0x0F, 0x17, 0x2A),
            editor: Color32::from_rgb(0x1A, 0x1A, 0x2A),
            border: Color32::from_rgb(0x33, 0x41, 0x55),
            accent: Color32::from_rgb(0x3B, 0x82, 0xF6),
            accent_soft: Color32::from_rgba_premultiplied(0x25, 0x63, 0xEB, 51),
            user_bubble: Color32::from_rgb(0x29, 0x80, 0xB9),
            assistant_bubble: Color32::from_rgb(0x1B, 0x26, 0x3B),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            text_primary: Color32::from_rgb(0xF1, 0xF5, 0xF9),
            text_muted: Color32::from_rgb(0x94, 0xA3, 0xB8),
            radius: 6,
            spacing: 12.0,
        }
    }
}

impl Theme {
    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.panel;
        visuals.override_text_color = Some(self.text_primary);
        visuals.extreme_bg_color = self.editor;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.bg_fill = self.tab_bar;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.sidebar;
        visuals.widgets.active.bg_fill = self.accent;
        visuals.selection.bg_fill = self.accent_soft;
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.window_fill = self.panel;

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(16.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(11.0));
        ctx.set_style(style);
    }

    pub fn bubble_frame(&self, author: Author) -> Frame {
        let fill = match author {
            Author::User => self.user_bubble,
            Author::Assistant => self.assistant_bubble,
        };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(self.spacing as i8))
            .corner_radius(CornerRadius::same(self.radius))
    }

    pub fn sidebar_frame(&self) -> Frame {
        Frame::new()
            .fill(self.sidebar)
            .inner_margin(Margin::same(8))
            .stroke(Stroke::new(1.0, self.border))
    }

    pub fn notice_frame(&self, level: NoticeLevel) -> Frame {
        let fill = match level {
            NoticeLevel::Info => self.assistant_bubble,
            NoticeLevel::Error => self.danger,
        };
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(self.spacing as i8))
            .corner_radius(CornerRadius::same(self.radius))
    }

    pub fn kind_color(&self, kind: FileKind) -> Color32 {
        match kind {
            FileKind::Html => Color32::from_rgb(0xF9, 0x73, 0x16),
            FileKind::Css => Color32::from_rgb(0x38, 0xBD, 0xF8),
            FileKind::JavaScript => Color32::from_rgb(0xFA, 0xCC, 0x15),
            FileKind::Text => self.text_muted,
        }
    }
}
