use std::{
    fmt::Display,
    io::{self, BufRead, Stdout, StdinLock, Write},
};

/// Line-oriented operator dialogue.
///
/// Generic over its streams so prompts can be driven from memory in tests.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    /// Prints `prompt` and returns the trimmed answer.
    ///
    /// End of input is an error: there is no one left to answer.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(answer.trim().to_string())
    }

    /// Asks a y/n question; an empty answer picks `default`.
    pub fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let answer = self.ask(prompt)?.to_ascii_lowercase();
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    /// Reads lines until an empty line or end of input.
    pub fn read_block(&mut self) -> io::Result<String> {
        let mut block = String::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 || line.trim().is_empty() {
                return Ok(block);
            }
            block.push_str(&line);
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
