use roster_app::RosterError;

pub const HELP: &str = "\
Commands:
  show                 Print the roster
  next | prev          Move one page forward or back
  page N               Jump to page N
  search [TEXT]        Filter by name, empty to clear
  edit ID              Start editing a user's score
  input ID VALUE       Type a new score for a user being edited
  save ID              Save the edited score
  cancel ID            Discard the edit
  reload               Fetch every user again
  refresh              Refresh one random score now
  metrics              Print the collected metrics
  help                 Show this message
  quit                 Exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Next,
    Prev,
    Page(i64),
    Search(String),
    Edit(u32),
    Input(u32, String),
    Save(u32),
    Cancel(u32),
    Reload,
    Refresh,
    Metrics,
    Help,
    Quit,
}

impl Command {
    /// Parse one line of user input. A blank line shows the roster.
    pub fn parse(line: &str) -> Result<Self, RosterError> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        let command = match name.to_lowercase().as_str() {
            "" | "show" => Self::Show,
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Prev,
            "page" => Self::Page(parse_number(rest, "page")?),
            "search" | "/" => Self::Search(rest.to_string()),
            "edit" => Self::Edit(parse_number(rest, "user id")?),
            "input" => {
                let (id, value) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                    RosterError::Validation("usage: input ID VALUE".to_string())
                })?;
                Self::Input(parse_number(id, "user id")?, value.trim().to_string())
            }
            "save" => Self::Save(parse_number(rest, "user id")?),
            "cancel" => Self::Cancel(parse_number(rest, "user id")?),
            "reload" => Self::Reload,
            "refresh" => Self::Refresh,
            "metrics" => Self::Metrics,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(RosterError::Validation(format!(
                    "Unknown command '{other}', type 'help' for the list"
                )));
            }
        };

        Ok(command)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, RosterError> {
    value
        .trim()
        .parse()
        .map_err(|_| RosterError::Validation(format!("Expected a {what}, got '{value}'")))
}
