use crate::clipboard::ClipboardSource;
use crate::core::error::GemtermError;
use crate::display;
use crate::input::{self, LineReader};
use crate::providers::LLMProvider;
use crate::render::Renderer;
use crate::session::{self, ChatSession};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const TEXT_MODE_KEYWORD: &str = "text mode";
const IMAGE_MODE_KEYWORD: &str = "image mode";

/// How the next input line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Chat with running history.
    Text,
    /// Image path plus caption, one-shot requests.
    Image,
}

/// What the loop does after one turn.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Stay,
    Switch(Mode),
    Quit,
}

pub struct Application {
    provider: Box<dyn LLMProvider>,
    renderer: Renderer,
    input: Box<dyn LineReader>,
    clipboard: Box<dyn ClipboardSource>,
    out: Box<dyn Write>,
    session: ChatSession,
}

impl Application {
    pub fn new(
        provider: Box<dyn LLMProvider>,
        renderer: Renderer,
        input: Box<dyn LineReader>,
        clipboard: Box<dyn ClipboardSource>,
        out: Box<dyn Write>,
    ) -> Self {
        Self {
            provider,
            renderer,
            input,
            clipboard,
            out,
            session: ChatSession::new(),
        }
    }

    /// Runs the REPL until end of input. Only input and terminal failures
    /// escape; request, file and clipboard errors are reported and the loop
    /// goes on.
    pub async fn run(&mut self, initial: Mode) -> Result<(), GemtermError> {
        display::write_banner(&mut self.out, self.renderer.width())?;

        let mut mode = initial;
        self.enter(mode)?;

        loop {
            let step = match mode {
                Mode::Text => self.text_turn().await?,
                Mode::Image => self.image_turn().await?,
            };

            match step {
                Step::Stay => {}
                Step::Switch(next) => {
                    info!(from = ?mode, to = ?next, "Switching mode");
                    mode = next;
                    self.enter(mode)?;
                }
                Step::Quit => break,
            }
        }

        info!("End of input, leaving");
        Ok(())
    }

    fn enter(&mut self, mode: Mode) -> Result<(), GemtermError> {
        if mode == Mode::Text {
            // Text mode always starts a fresh conversation
            self.session = ChatSession::new();
        }
        display::write_mode_banner(
            &mut self.out,
            mode,
            self.provider.model(),
            self.renderer.width(),
        )?;
        Ok(())
    }

    async fn text_turn(&mut self) -> Result<Step, GemtermError> {
        let Some(line) = self.input.read_line(&input::prompt_marker("The Prompt"))? else {
            return Ok(Step::Quit);
        };
        let prompt = line.trim();

        if prompt.is_empty() {
            display::write_notice(&mut self.out, "The Prompt is empty.")?;
            return Ok(Step::Stay);
        }
        if prompt.eq_ignore_ascii_case(IMAGE_MODE_KEYWORD) {
            return Ok(Step::Switch(Mode::Image));
        }

        // Trimming only decides emptiness and keywords; the line goes out as typed
        debug!(chars = line.len(), "Sending text prompt");
        match self
            .session
            .send_text(self.provider.as_ref(), &line)
            .await
        {
            Ok(response) => self.show(&response)?,
            Err(e) => display::write_error(&mut self.out, "Error sending message", &e)?,
        }
        Ok(Step::Stay)
    }

    async fn image_turn(&mut self) -> Result<Step, GemtermError> {
        let Some(line) = self.input.read_line(&input::prompt_marker("Path to Image"))? else {
            return Ok(Step::Quit);
        };

        let mut path = line.trim().to_string();
        if path.is_empty() {
            match self.clipboard.read_text() {
                Ok(text) => {
                    debug!(path = %text, "Using image path from clipboard");
                    path = text;
                }
                Err(e) => {
                    display::write_error(&mut self.out, "Error Reading Clipboard", &e)?;
                    return Ok(Step::Stay);
                }
            }
        }

        if path.eq_ignore_ascii_case(TEXT_MODE_KEYWORD) {
            return Ok(Step::Switch(Mode::Text));
        }

        let image = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                display::write_error(&mut self.out, "Error reading image file", &e)?;
                return Ok(Step::Stay);
            }
        };
        session::warn_if_not_jpeg(Path::new(&path));

        let Some(caption) = self.input.read_line(&input::prompt_marker("The Prompt"))? else {
            return Ok(Step::Quit);
        };

        debug!(path = %path, bytes = image.len(), "Sending image prompt");
        match session::send_image(self.provider.as_ref(), caption.trim(), image).await {
            Ok(response) => self.show(&response)?,
            Err(e) => display::write_error(&mut self.out, "Error generating content", &e)?,
        }
        Ok(Step::Stay)
    }

    fn show(&mut self, response: &crate::providers::Response) -> Result<(), GemtermError> {
        if let Err(e) = self.renderer.render_response(&mut self.out, response) {
            display::write_error(&mut self.out, "Error writing response", &e)?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn session(&self) -> &ChatSession {
        &self.session
    }
}
