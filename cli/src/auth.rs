//! Interactive sign-in and account creation.

use std::io::{BufRead, Write};

use closetly_core::{Role, validate_password, validate_username};
use closetly_sqlite::Session;
use tracing::debug;

use crate::console::{Console, MAX_PROMPT_ATTEMPTS};
use crate::error::Result;

/// How a sign-in attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The session now carries the account's role.
    SignedIn,
    /// Wrong password.
    Rejected,
    /// The user declined to sign up, gave up, or input ended.
    Declined,
}

/// Asks for a username and either signs in or offers to create an account.
pub fn login<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session,
) -> Result<LoginOutcome> {
    let Some(username) = console.prompt("Enter username: ")? else {
        return Ok(LoginOutcome::Declined);
    };
    let username = username.trim().to_string();

    if !session.closet().check_username(&username)? {
        return create_account(console, session, username);
    }

    let Some(password) = console.prompt("Enter password: ")? else {
        return Ok(LoginOutcome::Declined);
    };
    match session.login(&username, &password)? {
        Some(account) => {
            let greeting = format!("Welcome back, {}! Signed in as {}.", account.name, account.role);
            console.say(greeting)?;
            Ok(LoginOutcome::SignedIn)
        }
        None => {
            console.say("Incorrect login")?;
            Ok(LoginOutcome::Rejected)
        }
    }
}

fn create_account<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session,
    username: String,
) -> Result<LoginOutcome> {
    if !confirm_sign_up(console)? {
        return Ok(LoginOutcome::Declined);
    }

    let Some(name) = console.prompt("What is your name (first and last)?\n")? else {
        return Ok(LoginOutcome::Declined);
    };
    let Some(username) = settle_username(console, session, username)? else {
        return Ok(LoginOutcome::Declined);
    };
    let Some(role) = choose_role(console)? else {
        return Ok(LoginOutcome::Declined);
    };
    let Some(password) = choose_password(console)? else {
        return Ok(LoginOutcome::Declined);
    };

    let account = session.sign_up(name.trim(), &username, &password, role)?;
    debug!(user_id = account.user_id, "account created from console");
    let greeting = format!("Account created. Welcome, {}!", account.name);
    console.say(greeting)?;
    Ok(LoginOutcome::SignedIn)
}

fn confirm_sign_up<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<bool> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let Some(answer) = console.prompt("Would you like to create an account? [Y/N]\n")? else {
            return Ok(false);
        };
        match answer.trim().to_ascii_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => {
                console.say("Have a nice day!")?;
                return Ok(false);
            }
            _ => console.say("Sorry, this is not a valid response :( Please try again.")?,
        }
    }
    Ok(false)
}

/// Validates the requested username, asking for another until one fits and
/// is free. Nothing is written until a username is settled.
fn settle_username<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &Session,
    mut username: String,
) -> Result<Option<String>> {
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let problem = match validate_username(&username) {
            Err(err) => Some(err.to_string()),
            Ok(()) if session.closet().check_username(&username)? => {
                Some(format!("username {username} is already taken"))
            }
            Ok(()) => None,
        };
        let Some(problem) = problem else {
            return Ok(Some(username));
        };
        console.say(format!("Sorry, {problem}."))?;
        let Some(next) = console.prompt("Choose a different username: ")? else {
            return Ok(None);
        };
        username = next.trim().to_string();
    }
    console.say("Too many invalid usernames.")?;
    Ok(None)
}

/// Role menu for new accounts. Anything but `a` or `b` means personal use.
fn choose_role<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Option<Role>> {
    console.say("Account types: ")?;
    console.say("(a) Store Owner")?;
    console.say("(b) Stylist")?;
    console.say("(c) Personal Use")?;
    let role = console.choice("Enter account type: ")?.map(|key| match key {
        'a' => Role::StoreOwner,
        'b' => Role::Stylist,
        _ => Role::Personal,
    });
    Ok(role)
}

fn choose_password<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Option<String>> {
    let mut label = "What would you like your password to be?\n";
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let Some(password) = console.prompt(label)? else {
            return Ok(None);
        };
        match validate_password(&password) {
            Ok(()) => return Ok(Some(password)),
            Err(err) => {
                console.say(format!("Sorry, {err}."))?;
                label = "Choose another password (20 characters or less):\n";
            }
        }
    }
    console.say("Too many invalid passwords.")?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

    fn console(input: &str) -> TestConsole {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: TestConsole) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    fn session_with_ada() -> Session {
        let session = Session::open_in_memory().unwrap();
        session
            .closet()
            .register_account("Ada Lovelace", "ada", "s3cret", Role::Stylist)
            .unwrap();
        session
    }

    fn user_count(session: &Session) -> i64 {
        session
            .connection()
            .query_row("SELECT COUNT(*) FROM user_info", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_login_existing_user() {
        let mut session = session_with_ada();
        let mut c = console("ada\ns3cret\n");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::SignedIn);
        assert_eq!(session.role(), Some(Role::Stylist));
        assert!(output(c).contains("Welcome back, Ada Lovelace!"));
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let mut session = session_with_ada();
        let mut c = console("ada\nnope\n");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::Rejected);
        assert_eq!(session.role(), None);
        assert!(output(c).ends_with("Incorrect login\n"));
    }

    #[test]
    fn test_sign_up_as_store_owner() {
        let mut session = Session::open_in_memory().unwrap();
        let mut c = console("thrift\ny\nThrift Town\na\npw\n");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::SignedIn);
        assert_eq!(session.role(), Some(Role::StoreOwner));
        assert_eq!(session.account().unwrap().name, "Thrift Town");
    }

    #[test]
    fn test_unknown_role_choice_is_personal() {
        let mut session = Session::open_in_memory().unwrap();
        let mut c = console("bo\nY\nBo\nz\npw\n");
        login(&mut c, &mut session).unwrap();
        assert_eq!(session.role(), Some(Role::Personal));
    }

    #[test]
    fn test_decline_sign_up() {
        let mut session = Session::open_in_memory().unwrap();
        let mut c = console("bo\nn\n");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::Declined);
        assert!(output(c).contains("Have a nice day!"));
    }

    #[test]
    fn test_invalid_answers_end_after_three() {
        let mut session = Session::open_in_memory().unwrap();
        let mut c = console("bo\nmaybe\nperhaps\nsure\ny\n");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::Declined);
        assert_eq!(
            output(c).matches("not a valid response").count(),
            MAX_PROMPT_ATTEMPTS
        );
        assert_eq!(user_count(&session), 0);
    }

    #[test]
    fn test_long_username_is_replaced_before_any_write() {
        let mut session = Session::open_in_memory().unwrap();
        let long = "x".repeat(21);
        let mut c = console(&format!("{long}\ny\nBo\nbo\nb\npw\n"));
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::SignedIn);
        assert_eq!(session.account().unwrap().username, "bo");
        assert!(!session.closet().check_username(&long).unwrap());
    }

    #[test]
    fn test_long_username_gives_up_without_writing() {
        let mut session = Session::open_in_memory().unwrap();
        let long = "x".repeat(21);
        let mut c = console(&format!("{long}\ny\nBo\n{long}\n{long}\n{long}\n"));
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::Declined);
        assert_eq!(user_count(&session), 0);
    }

    #[test]
    fn test_taken_username_is_replaced() {
        let mut session = session_with_ada();
        let long = "y".repeat(25);
        // The first username is too long; its replacement "ada" is taken.
        let mut c = console(&format!("{long}\ny\nAnn\nada\nann\nc\npw\n"));
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::SignedIn);
        assert_eq!(session.account().unwrap().username, "ann");
        assert!(output(c).contains("ada is already taken"));
    }

    #[test]
    fn test_long_password_reprompts() {
        let mut session = Session::open_in_memory().unwrap();
        let long = "p".repeat(21);
        let mut c = console(&format!("bo\ny\nBo\nc\n{long}\nshort\n"));
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::SignedIn);
        assert!(session.closet().authenticate("bo", "short").unwrap());
    }

    #[test]
    fn test_end_of_input_declines() {
        let mut session = Session::open_in_memory().unwrap();
        let mut c = console("");
        assert_eq!(login(&mut c, &mut session).unwrap(), LoginOutcome::Declined);
    }
}
