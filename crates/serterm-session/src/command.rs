/// What the writer loop does with one console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand<'a> {
    /// Blank line; nothing happens.
    Empty,
    /// `exit`: end the session.
    Exit,
    /// `ON` / `OFF`: switch framed decoding on the receive side.
    Formatting(bool),
    /// Any other text, sent as one data frame.
    Send(&'a str),
}

impl<'a> ConsoleCommand<'a> {
    /// Interpret a line (without its line terminator).
    ///
    /// Commands match exactly; `Exit`, ` ON` and `off` are sent as text.
    pub fn parse(line: &'a str) -> Self {
        match line {
            "" => ConsoleCommand::Empty,
            "exit" => ConsoleCommand::Exit,
            "ON" => ConsoleCommand::Formatting(true),
            "OFF" => ConsoleCommand::Formatting(false),
            text => ConsoleCommand::Send(text),
        }
    }
}
