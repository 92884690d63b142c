use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "IDENTHASH_PASSWORD";

pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  IDENTHASH_PASSWORD="supersecret" identhash hash
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | identhash verify AQAAAAEAACcQ...
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided")
}

/// Reads a password that is about to be hashed, asking twice on a TTY and
/// expecting two matching lines on piped stdin.
pub fn read_new_password_with_confirmation() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        return read_confirmed(&mut stdin.lock());
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);
    confirm(pw1, &pw2)
}

fn read_confirmed(reader: &mut impl BufRead) -> Result<Zeroizing<String>> {
    let mut pw1 = Zeroizing::new(String::new());
    let mut pw2 = Zeroizing::new(String::new());

    reader.read_line(&mut pw1)?;
    reader.read_line(&mut pw2)?;

    trim_newline(&mut pw1);
    trim_newline(&mut pw2);

    confirm(pw1, &pw2)
}

fn confirm(pw1: Zeroizing<String>, pw2: &str) -> Result<Zeroizing<String>> {
    if pw1.is_empty() {
        bail!("password cannot be empty");
    }

    if pw1.as_str() != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_newline_strips_line_endings_only() {
        let mut s = String::from("pass word \r\n");
        trim_newline(&mut s);
        assert_eq!(s, "pass word ");
    }

    #[test]
    fn matching_lines_are_accepted() {
        let mut input = io::Cursor::new("hunter2\r\nhunter2\n");
        assert_eq!(read_confirmed(&mut input).unwrap().as_str(), "hunter2");
    }

    #[test]
    fn mismatched_lines_are_rejected() {
        let mut input = io::Cursor::new("hunter2\nhunter3\n");
        let err = read_confirmed(&mut input).unwrap_err();
        assert!(err.to_string().contains("passwords do not match"));
    }

    #[test]
    fn missing_confirmation_is_rejected() {
        let mut input = io::Cursor::new("hunter2\n");
        assert!(read_confirmed(&mut input).is_err());
    }

    #[test]
    fn empty_password_is_rejected() {
        let mut input = io::Cursor::new("\n\n");
        let err = read_confirmed(&mut input).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
