// Interactive menu for Chatbox CLI
//
// Line-oriented: every prompt reads one line. End of input exits the loop the
// same way option 8 does.

use anyhow::Result;
use chatbox_core::{
    Chatbox, ChatboxError, LogSink, LogStatus, Message, RecordKind, StoreError, User,
};
use colored::*;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    CreateUser,
    DisplayUsers,
    SendMessage,
    DisplayMessages,
    FilterMessages,
    SearchMessages,
    SortBySender,
    Exit,
}

impl MenuOption {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuOption::CreateUser),
            "2" => Some(MenuOption::DisplayUsers),
            "3" => Some(MenuOption::SendMessage),
            "4" => Some(MenuOption::DisplayMessages),
            "5" => Some(MenuOption::FilterMessages),
            "6" => Some(MenuOption::SearchMessages),
            "7" => Some(MenuOption::SortBySender),
            "8" => Some(MenuOption::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "1. Create User\n2. Display Users\n3. Send Message\n\
4. Display Messages\n5. Filter Messages by User\n\
6. Search Messages by Word\n7. Sort Messages by Sender\n8. Exit\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run the menu loop until the user exits or input ends
pub fn run_menu<S, R, W>(chatbox: &mut Chatbox<S>, input: R, output: W) -> Result<()>
where
    S: LogSink,
    R: BufRead,
    W: Write,
{
    let mut term = Terminal { input, output };

    loop {
        writeln!(term.output)?;
        write!(term.output, "{}", MENU)?;
        let Some(choice) = term.prompt("Enter your choice: ")? else {
            break;
        };

        let flow = match MenuOption::parse(&choice) {
            Some(MenuOption::CreateUser) => create_user(chatbox, &mut term)?,
            Some(MenuOption::DisplayUsers) => {
                display_users(chatbox.list_users(), "Users:", &mut term.output)?;
                Flow::Continue
            }
            Some(MenuOption::SendMessage) => send_message(chatbox, &mut term)?,
            Some(MenuOption::DisplayMessages) => {
                display_messages(chatbox.list_messages(), &mut term.output)?;
                Flow::Continue
            }
            Some(MenuOption::FilterMessages) => filter_messages(chatbox, &mut term)?,
            Some(MenuOption::SearchMessages) => search_messages(chatbox, &mut term)?,
            Some(MenuOption::SortBySender) => {
                chatbox.sort_by_sender();
                writeln!(
                    term.output,
                    "\n{} Messages sorted by sender name.",
                    "✓".green()
                )?;
                Flow::Continue
            }
            Some(MenuOption::Exit) => Flow::Exit,
            None => {
                writeln!(term.output, "{}", "Invalid option. Please try again.".red())?;
                Flow::Continue
            }
        };

        if flow == Flow::Exit {
            break;
        }
    }

    writeln!(term.output, "\nExiting...")?;
    term.output.flush()?;
    Ok(())
}

struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Print `label` and read one line without its terminator; `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like `prompt`, keeping only the first whitespace-delimited word
    fn prompt_word(&mut self, label: &str) -> Result<Option<String>> {
        Ok(self
            .prompt(label)?
            .map(|line| line.split_whitespace().next().unwrap_or("").to_string()))
    }
}

fn create_user<S: LogSink, R: BufRead, W: Write>(
    chatbox: &mut Chatbox<S>,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    let store = chatbox.store();
    if store.user_count() >= store.limits().max_users {
        writeln!(term.output, "\n{}", "Maximum number of users reached.".red())?;
        return Ok(Flow::Continue);
    }

    let Some(name) = term.prompt_word("\nEnter firstname: ")? else {
        return Ok(Flow::Exit);
    };

    match chatbox.register_user(&name) {
        Ok(user) => writeln!(
            term.output,
            "\n{} User created successfully. ({}. {})",
            "✓".green(),
            user.id,
            user.name.bright_cyan()
        )?,
        Err(e) => report_error(&mut term.output, &e)?,
    }
    Ok(Flow::Continue)
}

fn send_message<S: LogSink, R: BufRead, W: Write>(
    chatbox: &mut Chatbox<S>,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    let Some(sender) = select_user(chatbox, term, "sender's")? else {
        return Ok(Flow::Exit);
    };
    if sender.is_empty() {
        return Ok(Flow::Continue);
    }

    let Some(receiver) = select_user(chatbox, term, "receiver's")? else {
        return Ok(Flow::Exit);
    };
    if receiver.is_empty() {
        return Ok(Flow::Continue);
    }

    let Some(body) = term.prompt("\nEnter your message: ")? else {
        return Ok(Flow::Exit);
    };

    match chatbox.send_message(&sender, &receiver, body.trim_start()) {
        Ok(delivery) => {
            if let LogStatus::Failed(reason) = &delivery.log_status {
                writeln!(
                    term.output,
                    "\n{} Error writing the message log: {}",
                    "✗".red(),
                    reason
                )?;
            }
            writeln!(term.output, "\n{} Message sent successfully.", "✓".green())?;
        }
        Err(e) => report_error(&mut term.output, &e)?,
    }
    Ok(Flow::Continue)
}

/// List users and read a 1-based user number. Returns the empty sentinel for
/// an invalid number, `None` at end of input.
fn select_user<S: LogSink, R: BufRead, W: Write>(
    chatbox: &Chatbox<S>,
    term: &mut Terminal<R, W>,
    role: &str,
) -> Result<Option<String>> {
    display_users(chatbox.list_users(), "Available Users:", &mut term.output)?;

    let Some(answer) = term.prompt_word(&format!("\nEnter the {} user number: ", role))? else {
        return Ok(None);
    };

    let name = chatbox.select_user(answer.parse().unwrap_or(0));
    if name.is_empty() {
        writeln!(
            term.output,
            "\n{}",
            "Invalid user number. Please try again.".red()
        )?;
    }
    Ok(Some(name))
}

fn filter_messages<S: LogSink, R: BufRead, W: Write>(
    chatbox: &Chatbox<S>,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    if chatbox.list_messages().is_empty() {
        writeln!(term.output, "\n{}", "No messages available.".dimmed())?;
        return Ok(Flow::Continue);
    }

    let Some(sender) = term.prompt_word("\nEnter the sender's name: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(receiver) = term.prompt_word("\nEnter the receiver's name: ")? else {
        return Ok(Flow::Exit);
    };

    let found = chatbox.filter(&sender, &receiver);
    writeln!(term.output, "\n{}", "Filtered Messages:".bold())?;
    if found.is_empty() {
        writeln!(
            term.output,
            "\n{}",
            format!("No messages sent by {} to {}", sender, receiver).dimmed()
        )?;
    } else {
        for message in found {
            render_message(message, &mut term.output)?;
        }
    }
    Ok(Flow::Continue)
}

fn search_messages<S: LogSink, R: BufRead, W: Write>(
    chatbox: &Chatbox<S>,
    term: &mut Terminal<R, W>,
) -> Result<Flow> {
    if chatbox.list_messages().is_empty() {
        writeln!(term.output, "\n{}", "No messages available.".dimmed())?;
        return Ok(Flow::Continue);
    }

    let Some(word) = term.prompt_word("\nEnter the word to search for: ")? else {
        return Ok(Flow::Exit);
    };

    let found = chatbox.search(&word);
    writeln!(term.output, "\n{}", "Search Results:".bold())?;
    if found.is_empty() {
        writeln!(term.output, "{}", "Word not found.".dimmed())?;
    } else {
        for message in found {
            render_message(message, &mut term.output)?;
        }
    }
    Ok(Flow::Continue)
}

fn display_users<W: Write>(users: &[User], heading: &str, out: &mut W) -> Result<()> {
    if users.is_empty() {
        writeln!(out, "\n{}", "No users available.".dimmed())?;
        return Ok(());
    }

    writeln!(out, "\n{}", heading.bold())?;
    for (i, user) in users.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, user.name.bright_cyan())?;
    }
    Ok(())
}

fn display_messages<W: Write>(messages: &[Message], out: &mut W) -> Result<()> {
    if messages.is_empty() {
        writeln!(out, "\n{}", "No messages available.".dimmed())?;
        return Ok(());
    }

    writeln!(out, "\n{}", "Messages:".bold())?;
    for message in messages {
        render_message(message, out)?;
    }
    Ok(())
}

pub fn render_message<W: Write>(message: &Message, out: &mut W) -> Result<()> {
    writeln!(out, "Sender: {}", message.sender_name)?;
    writeln!(out, "Receiver: {}", message.receiver_name)?;
    writeln!(out, "Message: {}", message.body)?;
    writeln!(out, "Timestamp: {}", message.timestamp.dimmed())?;
    writeln!(out)?;
    Ok(())
}

fn report_error<W: Write>(out: &mut W, err: &ChatboxError) -> Result<()> {
    let text = match err {
        ChatboxError::Store(StoreError::CapacityExceeded {
            kind: RecordKind::User,
            ..
        }) => "Maximum number of users reached.".to_string(),
        ChatboxError::Store(StoreError::CapacityExceeded {
            kind: RecordKind::Message,
            ..
        }) => "Maximum number of messages reached.".to_string(),
        other => other.to_string(),
    };
    writeln!(out, "\n{} {}", "✗".red(), text.red())?;
    Ok(())
}
