// Line-oriented host input.
//
// Each stdin line is one recognizer result, `text` or `text<TAB>confidence`.
// A few slash commands stand in for the parts of the installation a terminal
// does not have:
//   /email <address>       submit the signup form
//   /weather rain|wind     start a weather effect now
//   /resize <w> <h>        resize the viewport
//   /quit                  end the session

use garden_core::weather::WeatherMode;

#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Speech { text: String, confidence: f64 },
    Email(String),
    Weather(WeatherMode),
    Resize { width: f64, height: f64 },
    Quit,
}

impl Input {
    /// Parse one line. Blank lines and unknown commands yield `None`.
    pub fn parse(line: &str, default_confidence: f64) -> Option<Input> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        if let Some(command) = line.trim_start().strip_prefix('/') {
            return parse_command(command);
        }
        let (text, confidence) = match line.rsplit_once('\t') {
            Some((text, conf)) => match conf.trim().parse::<f64>() {
                Ok(c) => (text, c),
                Err(_) => (line, default_confidence),
            },
            None => (line, default_confidence),
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Input::Speech {
            text: text.to_string(),
            confidence,
        })
    }
}

fn parse_command(command: &str) -> Option<Input> {
    let mut parts = command.split_whitespace();
    match parts.next()? {
        "email" => Some(Input::Email(parts.collect::<Vec<_>>().join(" "))),
        "weather" => match parts.next()? {
            "rain" | "rainout" => Some(Input::Weather(WeatherMode::Rainout)),
            "wind" | "windblow" => Some(Input::Weather(WeatherMode::Windblow)),
            _ => None,
        },
        "resize" => {
            let width = parts.next()?.parse().ok()?;
            let height = parts.next()?.parse().ok()?;
            Some(Input::Resize { width, height })
        }
        "quit" => Some(Input::Quit),
        _ => None,
    }
}
