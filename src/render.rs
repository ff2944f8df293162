use crate::core::error::GemtermError;
use crate::display;
use crate::providers::{Part, Response};
use console::style;
use std::io::Write;
use termimad::crossterm::style::{Attribute, Color};
use termimad::{MadSkin, StyledChar};

/// termimad needs some room to lay out tables and code blocks.
const MIN_WRAP_WIDTH: usize = 20;

fn ansi(value: u8) -> Color {
    Color::AnsiValue(value)
}

/// Dark style sheet used for model output.
pub fn markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();

    skin.paragraph.set_fg(ansi(250));

    let header_colors = [39, 38, 40, 165, 124, 35];
    for (header, color) in skin.headers.iter_mut().zip(header_colors) {
        header.set_fg(ansi(color));
    }
    skin.headers[0].set_bg(ansi(63));
    skin.headers[0].compound_style.add_attr(Attribute::Bold);

    skin.bold.set_fg(ansi(214));
    skin.italic.set_fg(ansi(245));
    skin.inline_code.set_fgbg(ansi(203), ansi(236));
    skin.code_block.set_fgbg(ansi(244), ansi(236));
    skin.table.set_fg(ansi(240));

    skin.bullet = StyledChar::from_fg_char(ansi(178), '•');
    skin.quote_mark = StyledChar::from_fg_char(ansi(240), '│');
    skin.horizontal_rule = StyledChar::from_fg_char(ansi(240), '─');

    skin
}

pub fn blob_placeholder(mime_type: &str, len: usize) -> String {
    format!("Blob: MIMEType={}, DataLength={}", mime_type, len)
}

/// Prints response parts, through the markdown skin unless `raw` is set.
pub struct Renderer {
    skin: MadSkin,
    raw: bool,
    width: Option<usize>,
}

impl Renderer {
    pub fn new(styled: bool, raw: bool) -> Self {
        let skin = if styled {
            markdown_skin()
        } else {
            MadSkin::no_style()
        };
        Self {
            skin,
            raw,
            width: None,
        }
    }

    /// Pins the wrap width instead of asking the terminal on every render.
    #[cfg(test)]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn width(&self) -> usize {
        self.width.unwrap_or_else(display::terminal_width)
    }

    pub fn render_markdown(&self, markdown: &str, width: usize) -> String {
        self.skin
            .text(markdown, Some(width.max(MIN_WRAP_WIDTH)))
            .to_string()
    }

    pub fn render_response(
        &self,
        out: &mut dyn Write,
        response: &Response,
    ) -> Result<(), GemtermError> {
        let width = self.width();

        for candidate in &response.candidates {
            let Some(content) = &candidate.content else {
                continue;
            };
            for part in &content.parts {
                let rendered = match part {
                    Part::Text(text) if self.raw => text.clone(),
                    Part::Text(text) => self.render_markdown(text, width),
                    Part::Blob { mime_type, data } => {
                        self.render_markdown(&blob_placeholder(mime_type, data.len()), width)
                    }
                };
                write!(out, "{}", rendered).map_err(write_failed)?;
                if !rendered.ends_with('\n') {
                    writeln!(out).map_err(write_failed)?;
                }
            }
        }

        writeln!(out, "{}", style(display::separator(width)).dim()).map_err(write_failed)?;
        out.flush().map_err(write_failed)
    }
}

fn write_failed(err: std::io::Error) -> GemtermError {
    GemtermError::Render(format!("Failed to write response: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{Candidate, Content, Role};

    fn plain(width: usize) -> Renderer {
        Renderer::new(false, false).with_width(width)
    }

    fn render(renderer: &Renderer, response: &Response) -> String {
        let mut out = Vec::new();
        renderer.render_response(&mut out, response).unwrap();
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string()
    }

    #[test]
    fn text_parts_keep_their_content() {
        let output = render(&plain(80), &Response::from_text("Hi there"));
        assert!(output.contains("Hi there"));
        assert!(output.trim_end().ends_with(&"─".repeat(77)));
    }

    #[test]
    fn styled_skin_keeps_the_words_intact() {
        let renderer = Renderer::new(true, false).with_width(80);
        let output = render(&renderer, &Response::from_text("Hi there"));
        assert!(output.contains("Hi there"));
    }

    #[test]
    fn markdown_is_formatted() {
        let output = render(&plain(80), &Response::from_text("Some **bold** text"));
        assert!(output.contains("bold"));
        assert!(!output.contains("**"));
    }

    #[test]
    fn long_text_wraps_to_the_width() {
        let words = "word ".repeat(40);
        let output = plain(30).render_markdown(&words, 30);
        for line in output.lines() {
            assert!(console::measure_text_width(line) <= 30, "line too wide: {:?}", line);
        }
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn raw_mode_prints_verbatim() {
        let renderer = Renderer::new(false, true).with_width(80);
        let output = render(&renderer, &Response::from_text("# Title\n**bold**"));
        assert!(output.starts_with("# Title\n**bold**\n"));
    }

    #[test]
    fn blobs_render_as_placeholders() {
        let response = Response {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some(Role::Model),
                    parts: vec![Part::Blob {
                        mime_type: "image/png".to_string(),
                        data: vec![0; 42],
                    }],
                }),
                finish_reason: None,
            }],
        };
        let output = render(&plain(80), &response);
        assert!(output.contains("Blob: MIMEType=image/png, DataLength=42"));
    }

    #[test]
    fn candidates_without_content_are_skipped() {
        let response = Response {
            candidates: vec![
                Candidate {
                    content: None,
                    finish_reason: Some("MAX_TOKENS".to_string()),
                },
                Response::from_text("second").candidates.remove(0),
            ],
        };
        let output = render(&plain(80), &response);
        assert!(output.contains("second"));
    }
}
