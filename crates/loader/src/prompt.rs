//! Interactive go/no-go before wiping existing data.

use std::io::{self, BufRead, Write};

pub const QUESTION: &str =
    "This imports the CSV files into the database. All current data will be deleted. Run the import? (Y/n) ";
pub const RETRY: &str = "Enter \"yes\" or \"no\": ";

/// `Y`/`yes` proceed, `n`/`no` abort, anything else is not an answer.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim() {
        "Y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask until a recognised answer arrives. End of input aborts.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "{QUESTION}")?;
    loop {
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
        write!(output, "{RETRY}")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_are_exact() {
        assert_eq!(parse_answer("Y\n"), Some(true));
        assert_eq!(parse_answer("yes"), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer(" no \n"), Some(false));
        for other in ["y", "N", "YES", "", "maybe"] {
            assert_eq!(parse_answer(other), None, "{other:?}");
        }
    }

    #[test]
    fn confirm_reprompts_until_answered() {
        let mut output = Vec::new();
        let answer = confirm("maybe\n\nyes\n".as_bytes(), &mut output).unwrap();
        assert!(answer);

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with(QUESTION));
        assert_eq!(printed.matches(RETRY).count(), 2);
    }

    #[test]
    fn confirm_aborts_on_no_or_eof() {
        assert!(!confirm("no\n".as_bytes(), Vec::new()).unwrap());
        assert!(!confirm("huh\n".as_bytes(), Vec::new()).unwrap());
    }
}
