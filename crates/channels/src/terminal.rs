use crate::traits::Channel;
use adjutant_core::CoreError;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// Interactive stdin/stdout session.
pub struct TerminalChannel {
    reader: BufReader<Stdin>,
    prompt: String,
}

impl TerminalChannel {
    pub fn new(prompt: &str) -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            prompt: prompt.to_string(),
        }
    }
}

impl Default for TerminalChannel {
    fn default() -> Self {
        Self::new("adjutant> ")
    }
}

#[async_trait]
impl Channel for TerminalChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn next_line(&mut self) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        let _ = stdout.write_all(self.prompt.as_bytes()).await;
        let _ = stdout.flush().await;

        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => None, // EOF
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(_) => None,
        }
    }

    async fn send(&mut self, text: &str) -> Result<(), CoreError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}
