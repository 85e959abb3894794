use std::error::Error;
use std::io::{self, Stdin};

use rustyline::error::ReadlineError;
use rustyline::Editor;
use thiserror::Error;

use crate::config::Config;
use crate::io::{OutputStream, Tracked};
use crate::memory::AccessError;
use crate::session::{Session, SessionError};
use crate::types::Cell;

const HISTORY: &str = "history.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Char,
    Decimal,
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    General,
    Language,
    Where,
    Print,
    Display,
    Show,
    Reset,
}

impl Topic {
    fn from_name(name: &str) -> Topic {
        match name {
            "bf" | "brainfuck" => Topic::Language,
            "where" => Topic::Where,
            "print" => Topic::Print,
            "disp" => Topic::Display,
            "show" => Topic::Show,
            "reset" => Topic::Reset,
            _ => Topic::General,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
    Where,
    Print(Option<i64>),
    Display {
        address: Option<i64>,
        format: Format,
        count: i64,
    },
    Help(Topic),
    Show(String),
    Run(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        crate::nom::parse("command", parse::input_line, line)
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("Position {0} is out of range")]
    OutOfRange(i64),

    #[error("Output failure: {0}")]
    Output(#[from] io::Error),
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct Interpreter {
    session: Session,
    input: Stdin,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        Interpreter {
            session: Session::new(config),
            input: io::stdin(),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Reset => self.session.reset(),
            Command::Where => {
                let tape = self.session.tape();
                let value = tape.current();
                println!(
                    "Cell {} -> contains '{}' | {} | 0x{:x}",
                    tape.cursor(),
                    printable(value),
                    value,
                    value
                );

                if self.session.config().dialect.is_extended() {
                    let channels = self.session.channels();
                    println!(
                        "File {}, socket {}",
                        open_or_closed(channels.file.is_open()),
                        open_or_closed(channels.socket.is_open())
                    );
                }
            }
            Command::Print(address) => {
                let tape = self.session.tape();
                let address = address.unwrap_or(tape.cursor() as i64);
                let text = match tape.c_str(address as isize) {
                    Ok(text) => text,
                    Err(AccessError::Unterminated { start }) => &tape.cells()[start..],
                    Err(AccessError::OutOfBounds { .. }) => {
                        return Err(CommandError::OutOfRange(address))
                    }
                };

                println!("memory at {}: {}", address, String::from_utf8_lossy(text));
            }
            Command::Display {
                address,
                format,
                count,
            } => {
                let tape = self.session.tape();
                let start = match address {
                    None | Some(-1) => tape.cursor() as i64,
                    Some(address) => address,
                };

                if tape.load(start as isize).is_err() {
                    return Err(CommandError::OutOfRange(start));
                }

                let cells = (start..start.saturating_add(count.max(0)))
                    .map_while(|address| tape.load(address as isize).ok())
                    .collect::<Vec<_>>();
                print!("{}", dump(&cells, format));
            }
            Command::Help(topic) => println!("{}", help(topic, self.session.config())),
            Command::Show(source) => {
                let program = self.session.compile(&source).map_err(SessionError::from)?;
                if program.is_empty() {
                    println!("No instructions");
                }
                for instruction in program.instructions() {
                    println!("{}", instruction);
                }
            }
            Command::Run(source) => {
                let mut output = Tracked::new(io::stdout());
                let result = self.session.evaluate(&source, &mut self.input, &mut output);

                output.flush()?;
                if output.written() {
                    println!();
                }

                result?;
            }
        }

        Ok(Flow::Continue)
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let mut rl = Editor::<()>::new();
        if rl.load_history(HISTORY).is_err() {
            println!("No previous history.");
        }

        loop {
            let readline = rl.readline(": ");
            match readline {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    rl.add_history_entry(line.as_str());

                    let result = Command::parse(line.as_str())
                        .map_err(CommandError::Parse)
                        .and_then(|command| self.execute(command));

                    match result {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(CommandError::Session(SessionError::Runtime {
                            source,
                            rolled_back,
                        })) => {
                            println!("Runtime error: {}", source);
                            if rolled_back {
                                println!("Rolling back memory...");
                            }
                        }
                        Err(e) => println!("{}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
        rl.save_history(HISTORY)?;

        Ok(())
    }
}

fn printable(value: Cell) -> char {
    if value.is_ascii_graphic() || value == b' ' {
        value as char
    } else {
        '.'
    }
}

fn open_or_closed(open: bool) -> &'static str {
    if open {
        "open"
    } else {
        "closed"
    }
}

fn dump(cells: &[Cell], format: Format) -> String {
    let mut out = String::new();
    for (i, &value) in cells.iter().enumerate() {
        let cell = match format {
            Format::Char => printable(value).to_string(),
            Format::Decimal => value.to_string(),
            Format::Hex => format!("{:x}", value),
        };
        out.push_str(&cell);
        out.push_str("  ");

        if i % 5 == 4 {
            out.push('\n');
        }
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn help(topic: Topic, config: &Config) -> String {
    match topic {
        Topic::General => "\
Available commands:
help [topic]  Show this page. 'help bf' shows the operator guide, 'help <command>'
              shows help for a single command.
where         Show the cursor position and the current cell.
print [n]     Print memory from address n as text, up to the first 0 byte.
disp [n] [c|d|x] [count]
              Display count cells from address n as char, decimal or hex.
show <code>   Show the compiled instruction stream for code without running it.
reset         Zero the tape and the cursor.
quit          Leave the interpreter.
Anything else is run as code. Memory is rolled back if a run fails."
            .to_string(),
        Topic::Language => {
            let mut guide = String::from(
                "\
 Op | Effect
  +   Increment the current cell.
  -   Decrement the current cell.
  <   Move the cursor left.
  >   Move the cursor right.
  ,   Read one byte from stdin into the current cell (0 at end of input).
  .   Write the current cell to stdout.
  [   If the current cell is 0, jump past the matching ']'.
  ]   Jump back to the matching '['.",
            );

            if config.dialect.is_extended() {
                guide.push_str(
                    "
  #   Open a file, or close it if one is open. The name starts n cells away,
      n being the current cell as a signed byte, and ends at a 0 byte. The
      current cell is set to 0 on success, -1 on failure.
  ;   Write the current cell to the file.
  :   Read one byte from the file into the current cell (0 at end of file).
  %   Open a socket, or close it if one is open. Layout from n cells away:
      host, 0 byte, port (2 bytes, big endian). An empty host waits for one
      incoming connection. The current cell is set to 0 or -1.
  ^   Send the current cell through the socket.
  !   Receive one byte from the socket into the current cell.",
                );
            }

            guide
        }
        Topic::Where => "where - Display the cursor position and the current cell.\nUsage: where".to_string(),
        Topic::Print => "\
print - Print the text at an address, stopping at a 0 byte.
Usage: print [n]
       n - address to print from, the cursor if omitted."
            .to_string(),
        Topic::Display => "\
disp - Display memory at an address.
Usage: disp [n] [type] [count]
       n     - address to display from, -1 or omitted for the cursor.
       type  - c for characters, d for decimal, x for hexadecimal (default).
       count - number of cells, 1 if omitted."
            .to_string(),
        Topic::Show => "show - Print the compiled instructions of code.\nUsage: show <code>".to_string(),
        Topic::Reset => "reset - Zero all memory and move the cursor to 0.\nUsage: reset".to_string(),
    }
}

mod parse {
    // Input ::= Quit | Reset | Where | Print | Disp | Help | Show | Code
    // Quit ::= 'quit'
    // Reset ::= 'reset'
    // Where ::= 'where'
    // Print ::= 'print' Integer?
    // Disp ::= 'disp' Integer? Format? Integer?
    // Help ::= 'help' Word?
    // Show ::= 'show' Code
    // A line starting with a keyword that does not fit its rule is an error.
    // Code ::= <anything>

    use super::{Command, Format, Topic};
    use crate::nom::{key, spaces, Input, Parsed};
    use crate::types::parse::integer;

    use nom::branch::alt;
    use nom::character::complete::{alpha1, none_of, one_of, space1};
    use nom::combinator::{all_consuming, cut, map, not, opt, rest};
    use nom::sequence::{preceded, terminated};

    pub fn input_line(input: Input) -> Parsed<Command> {
        alt((
            command("quit", map(spaces, |_| Command::Quit)),
            command("reset", map(spaces, |_| Command::Reset)),
            command("where", map(spaces, |_| Command::Where)),
            command("print", map(opt(argument(integer)), Command::Print)),
            command("disp", display),
            command(
                "help",
                map(opt(argument(alpha1)), |topic| {
                    Command::Help(topic.map(Topic::from_name).unwrap_or(Topic::General))
                }),
            ),
            preceded(
                keyword("show"),
                cut(preceded(
                    space1,
                    map(rest, |code: Input| Command::Show(code.to_string())),
                )),
            ),
            map(rest, |code: Input| Command::Run(code.to_string())),
        ))(input)
    }

    fn display(input: Input) -> Parsed<Command> {
        let (input, address) = opt(argument(integer))(input)?;
        let (input, format) = opt(argument(display_format))(input)?;
        let (input, count) = opt(argument(integer))(input)?;

        let command = Command::Display {
            address,
            format: format.unwrap_or(Format::Hex),
            count: count.unwrap_or(1),
        };
        Ok((input, command))
    }

    fn display_format(input: Input) -> Parsed<Format> {
        map(one_of("cCdDxX"), |c| match c.to_ascii_lowercase() {
            'c' => Format::Char,
            'd' => Format::Decimal,
            _ => Format::Hex,
        })(input)
    }

    fn argument<'a, P, O>(parser: P) -> impl Fn(Input<'a>) -> Parsed<'a, O>
    where
        P: Fn(Input<'a>) -> Parsed<'a, O>,
    {
        preceded(space1, parser)
    }

    // once the keyword matched, the rest of the line must fit its arguments
    fn command<'a, P>(name: &'a str, parser: P) -> impl Fn(Input<'a>) -> Parsed<'a, Command>
    where
        P: Fn(Input<'a>) -> Parsed<'a, Command>,
    {
        preceded(keyword(name), cut(all_consuming(terminated(parser, spaces))))
    }

    // a keyword followed by a blank or the end of the line
    fn keyword<'a>(name: &'a str) -> impl Fn(Input<'a>) -> Parsed<'a, Input<'a>> {
        terminated(key(name), not(none_of(" \t\r\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap()
    }

    #[test]
    fn admin_commands() {
        assert_eq!(parse("quit"), Command::Quit);
        assert_eq!(parse("  reset "), Command::Reset);
        assert_eq!(parse("where"), Command::Where);
        assert_eq!(parse("print"), Command::Print(None));
        assert_eq!(parse("print 12"), Command::Print(Some(12)));
        assert_eq!(parse("help"), Command::Help(Topic::General));
        assert_eq!(parse("help bf"), Command::Help(Topic::Language));
        assert_eq!(parse("help disp"), Command::Help(Topic::Display));
        assert_eq!(parse("help nonsense"), Command::Help(Topic::General));
    }

    #[test]
    fn display_arguments() {
        assert_eq!(
            parse("disp"),
            Command::Display {
                address: None,
                format: Format::Hex,
                count: 1
            }
        );
        assert_eq!(
            parse("disp -1 c 10"),
            Command::Display {
                address: Some(-1),
                format: Format::Char,
                count: 10
            }
        );
        assert_eq!(
            parse("disp 4 D"),
            Command::Display {
                address: Some(4),
                format: Format::Decimal,
                count: 1
            }
        );
    }

    #[test]
    fn everything_else_is_code() {
        assert_eq!(parse("+++[-]"), Command::Run("+++[-]".to_string()));
        assert_eq!(parse("where+"), Command::Run("where+".to_string()));
        assert_eq!(parse("printing+"), Command::Run("printing+".to_string()));
        assert_eq!(parse("show +[-]"), Command::Show("+[-]".to_string()));
    }

    #[test]
    fn malformed_commands_are_errors() {
        assert!(Command::parse("disp 3 q").is_err());
        assert!(Command::parse("print x").is_err());
        assert!(Command::parse("quit now").is_err());
        assert!(Command::parse("show").is_err());
        assert!(Command::parse("help 3").is_err());
    }

    #[test]
    fn huge_display_count_stops_at_tape_end() {
        let mut interpreter = Interpreter::new(Config::default().tape_size(8));
        let command = parse("disp 5 x 9223372036854775807");
        assert!(matches!(interpreter.execute(command), Ok(Flow::Continue)));

        let command = parse("disp 9223372036854775807 x 2");
        assert!(matches!(
            interpreter.execute(command),
            Err(CommandError::OutOfRange(9223372036854775807))
        ));
    }

    #[test]
    fn dump_wraps_every_five_cells() {
        let cells = [0, 1, 2, 3, 4, 255];
        assert_eq!(dump(&cells, Format::Hex), "0  1  2  3  4  \nff  \n");
        assert_eq!(dump(&cells[..2], Format::Decimal), "0  1  \n");
        assert_eq!(dump(b"hi\n", Format::Char), "h  i  .  \n");
    }

    #[test]
    fn extended_guide_only_with_extended_dialect() {
        let base = Config::default();
        let extended = Config::default().dialect(crate::types::Dialect::Extended);
        assert!(!help(Topic::Language, &base).contains("Open a socket"));
        assert!(help(Topic::Language, &extended).contains("Open a socket"));
    }
}
