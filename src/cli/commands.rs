use std::io::{self, Write};

use chrono::{DateTime, Local, Timelike, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::models::{Feedback, Id};
use crate::client::ClinicClient;
use crate::error::{AppError, AppResult};
use crate::identity::SessionStatus;
use crate::views::{
    equipment_status_label, format_datetime, format_price_br, permission_label, stars, Alert, AppointmentEdit,
    AppointmentForm, CardDetail, Dashboard, EquipmentForm, LoginForm, Operation, ProfileForm, ProfileView, TreatmentForm,
};

use super::args::{parse_args, UsageError, USAGE};
use super::render_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Confirm,
    Cancel,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(LoginForm),
    Logout,
    Whoami,
    Dashboard,
    Appointment(StatusChange, Id),
    AppointmentEdit(Id, AppointmentEdit),
    Book(Id, DateTime<Utc>),
    Groups,
    Treatments(String),
    TreatmentEdit(Id, TreatmentForm),
    Equipment(String),
    EquipmentEdit { id: Id, name: String, description: String, status: String },
    Feedback { unread: bool },
    FeedbackToggle(Id),
    FeedbackDelete(Id),
    ProfileEdit(ProfileForm),
    Help,
    Quit,
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Command::Login(_) => Operation::Login,
            Command::Logout => Operation::Logout,
            Command::Whoami | Command::Help | Command::Quit => Operation::LoadUser,
            Command::Dashboard => Operation::LoadAppointments,
            Command::Appointment(StatusChange::Confirm, _) => Operation::ConfirmAppointment,
            Command::Appointment(StatusChange::Cancel, _) => Operation::CancelAppointment,
            Command::Appointment(StatusChange::Delete, _) => Operation::DeleteAppointment,
            Command::AppointmentEdit(..) => Operation::EditAppointment,
            Command::Book(..) => Operation::BookAppointment,
            Command::Groups => Operation::LoadTreatmentGroups,
            Command::Treatments(_) => Operation::LoadTreatments,
            Command::TreatmentEdit(..) => Operation::UpdateTreatment,
            Command::Equipment(_) => Operation::LoadEquipment,
            Command::EquipmentEdit { .. } => Operation::UpdateEquipment,
            Command::Feedback { .. } => Operation::LoadFeedback,
            Command::FeedbackToggle(_) => Operation::ToggleFeedback,
            Command::FeedbackDelete(_) => Operation::DeleteFeedback,
            Command::ProfileEdit(_) => Operation::SaveProfile,
        }
    }
}

/// Split a REPL line into words. Single or double quotes group words with spaces.
pub fn split_words(line: &str) -> Result<Vec<String>, UsageError> {
    let mut words = Vec::new();
    let mut cur = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => cur.push(ch),
            None if ch == '"' || ch == '\'' => { quote = Some(ch); in_word = true; }
            None if ch.is_whitespace() => {
                if in_word { words.push(std::mem::take(&mut cur)); in_word = false; }
            }
            None => { cur.push(ch); in_word = true; }
        }
    }
    if quote.is_some() {
        return Err(UsageError("unterminated quote".into()));
    }
    if in_word { words.push(cur); }
    Ok(words)
}

fn id_arg(words: &[String], idx: usize, what: &str) -> Result<Id, UsageError> {
    let raw = words.get(idx).ok_or_else(|| UsageError(format!("{} requires an id", what)))?;
    raw.parse::<Id>().map_err(|_| UsageError(format!("'{}' is not an id", raw)))
}

fn date_arg(raw: &str) -> Result<DateTime<Utc>, UsageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| UsageError(format!("'{}' is not an RFC 3339 date (e.g. 2024-05-02T14:30:00-03:00)", raw)))
}

fn arity(words: &[String], min: usize, max: usize, usage: &str) -> Result<(), UsageError> {
    if words.len() < min || words.len() > max {
        return Err(UsageError(format!("usage: {}", usage)));
    }
    Ok(())
}

pub fn parse_command(words: &[String]) -> Result<Command, UsageError> {
    let head = words.first().map(|s| s.to_ascii_lowercase()).ok_or_else(|| UsageError("empty command".into()))?;
    let arg = |i: usize| words.get(i).cloned().unwrap_or_default();
    match head.as_str() {
        "login" => {
            arity(words, 3, 3, "login <email> <password>")?;
            Ok(Command::Login(LoginForm::new(&words[1], &words[2])))
        }
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),
        "dashboard" => Ok(Command::Dashboard),
        "appointments" => {
            let sub = words.get(1).map(|s| s.to_ascii_lowercase()).unwrap_or_default();
            match sub.as_str() {
                "confirm" | "cancel" | "delete" => {
                    arity(words, 3, 3, "appointments confirm|cancel|delete <id>")?;
                    let change = match sub.as_str() {
                        "confirm" => StatusChange::Confirm,
                        "cancel" => StatusChange::Cancel,
                        _ => StatusChange::Delete,
                    };
                    Ok(Command::Appointment(change, id_arg(words, 2, "appointments")?))
                }
                "edit" => {
                    let id = id_arg(words, 2, "appointments edit")?;
                    let mut edit = AppointmentEdit::default();
                    let mut i = 3;
                    while i < words.len() {
                        let value = words.get(i + 1).ok_or_else(|| UsageError(format!("{} requires a value", words[i])))?;
                        match words[i].as_str() {
                            "--date" => edit.date = Some(date_arg(value)?),
                            "--status" => edit.status = Some(value.clone()),
                            other => return Err(UsageError(format!("unknown option {}", other))),
                        }
                        i += 2;
                    }
                    Ok(Command::AppointmentEdit(id, edit))
                }
                _ => Err(UsageError("usage: appointments confirm|cancel|delete|edit <id>".into())),
            }
        }
        "book" => {
            arity(words, 3, 3, "book <treatment-id> <rfc3339>")?;
            Ok(Command::Book(id_arg(words, 1, "book")?, date_arg(&words[2])?))
        }
        "groups" => Ok(Command::Groups),
        "treatments" => Ok(Command::Treatments(words[1..].join(" "))),
        "treatment-edit" => {
            arity(words, 6, 6, "treatment-edit <id> <name> <description> <price> <duration>")?;
            let form = TreatmentForm { name: arg(2), description: arg(3), price: arg(4), duration: arg(5) };
            Ok(Command::TreatmentEdit(id_arg(words, 1, "treatment-edit")?, form))
        }
        "equipment" => Ok(Command::Equipment(words[1..].join(" "))),
        "equipment-edit" => {
            arity(words, 5, 5, "equipment-edit <id> <name> <description> <status>")?;
            Ok(Command::EquipmentEdit { id: id_arg(words, 1, "equipment-edit")?, name: arg(2), description: arg(3), status: arg(4) })
        }
        "feedback" => match words.get(1).map(String::as_str) {
            None => Ok(Command::Feedback { unread: true }),
            Some("--read") => Ok(Command::Feedback { unread: false }),
            Some(other) => Err(UsageError(format!("unknown option {}", other))),
        },
        "feedback-toggle" => Ok(Command::FeedbackToggle(id_arg(words, 1, "feedback-toggle")?)),
        "feedback-delete" => Ok(Command::FeedbackDelete(id_arg(words, 1, "feedback-delete")?)),
        "profile-edit" => {
            arity(words, 3, 5, "profile-edit <name> <email> [phone] [address]")?;
            Ok(Command::ProfileEdit(ProfileForm {
                name: arg(1),
                email: arg(2),
                phone: words.get(3).cloned(),
                address: words.get(4).cloned(),
                avatar_url: None,
            }))
        }
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(UsageError(format!("unknown command '{}'", other))),
    }
}

fn when(dt: &DateTime<Utc>) -> String { format_datetime(&dt.with_timezone(&Local)) }

fn render_dashboard(d: &Dashboard) -> String {
    let mut out = vec![format!("{}, {}", d.header.greeting, d.header.name)];
    for tab in &d.tabs {
        out.push(String::new());
        out.push(format!("== {} ({}) ==", tab.title(), tab.cards.len()));
        if let Some(msg) = tab.empty_message() {
            out.push(msg.to_string());
            continue;
        }
        if d.header.role.is_admin() {
            let rows: Vec<Vec<String>> = tab.cards.iter().map(|c| {
                let (client, phone) = match &c.detail {
                    CardDetail::Admin { client_name, client_phone, .. } => (client_name.clone(), client_phone.clone()),
                    CardDetail::User { .. } => (String::new(), String::new()),
                };
                let actions = c.actions().iter().map(|a| a.label()).collect::<Vec<_>>().join(" / ");
                vec![c.id.to_string(), c.treatment.clone(), client, phone, c.when.clone(), c.status_label.to_string(), actions]
            }).collect();
            out.push(render_table(&["id", "treatment", "client", "phone", "when", "status", "actions"], &rows));
        } else {
            let rows: Vec<Vec<String>> = tab.cards.iter().map(|c| {
                let (categories, duration, price) = match &c.detail {
                    CardDetail::User { categories, duration, price_label } => (categories.clone(), duration.clone(), price_label.clone()),
                    CardDetail::Admin { .. } => (String::new(), String::new(), String::new()),
                };
                vec![c.id.to_string(), c.treatment.clone(), categories, duration, c.when.clone(), price, c.status_label.to_string()]
            }).collect();
            out.push(render_table(&["id", "treatment", "categories", "duration", "when", "price", "status"], &rows));
        }
    }
    out.join("\n")
}

fn render_feedback(items: &[Feedback]) -> String {
    let rows: Vec<Vec<String>> = items.iter().map(|f| vec![
        f.id.to_string(),
        f.client.name.clone(),
        f.treatment.name.clone(),
        stars(f.rating),
        f.comment.clone(),
        f.created_at.as_ref().map(when).unwrap_or_default(),
    ]).collect();
    render_table(&["id", "client", "treatment", "rating", "comment", "created"], &rows)
}

/// Look up the current read flag, checking the inbox first.
async fn find_feedback(client: &ClinicClient, id: Id) -> AppResult<Feedback> {
    for unread in [true, false] {
        if let Some(f) = client.feedback(unread).await?.into_iter().find(|f| f.id == id) {
            return Ok(f);
        }
    }
    Err(AppError::not_found("feedback_not_found".to_string(), format!("no feedback with id {}", id)))
}

/// What the command printed, or `None` when the session should end.
pub async fn execute(client: &ClinicClient, cmd: &Command) -> AppResult<Option<String>> {
    debug!(op = ?cmd.operation(), "execute");
    let out = match cmd {
        Command::Login(form) => {
            let view = client.login(form).await?;
            format!("Logged in as {} ({})", view.name, permission_label(&view.role))
        }
        Command::Logout => {
            client.logout()?;
            "Logged out".to_string()
        }
        Command::Whoami => match client.session() {
            SessionStatus::Authenticated(view) => {
                let p = ProfileView::from_session(&view);
                format!("{} <{}>\nid: {}\npermission: {}\navatar: {}", p.name, p.email, view.id, p.permission, p.avatar_url)
            }
            SessionStatus::Unauthenticated(reason) => match Alert::session(&reason) {
                Some(alert) => alert.to_string(),
                None => "Not logged in".to_string(),
            },
        },
        Command::Dashboard => render_dashboard(&client.dashboard(Local::now().hour()).await?),
        Command::Appointment(change, id) => {
            match change {
                StatusChange::Confirm => client.confirm_appointment(*id).await?,
                StatusChange::Cancel => client.cancel_appointment(*id).await?,
                StatusChange::Delete => client.delete_appointment(*id).await?,
            }
            format!("Appointment {} updated", id)
        }
        Command::AppointmentEdit(id, edit) => {
            client.edit_appointment(*id, edit).await?;
            success(cmd)
        }
        Command::Book(treatment_id, date) => {
            let form = AppointmentForm::new(*date).with_treatment(*treatment_id);
            client.book_appointment(&form).await?;
            success(cmd)
        }
        Command::Groups => {
            let groups = client.treatment_groups().await?;
            let mut rows = Vec::new();
            for g in &groups {
                for c in &g.categories {
                    for t in &c.treatments {
                        rows.push(vec![g.name.clone(), c.name.clone(), t.id.to_string(), t.name.clone(), t.duration.to_string(), format_price_br(&t.price)]);
                    }
                }
            }
            render_table(&["group", "category", "id", "treatment", "minutes", "price"], &rows)
        }
        Command::Treatments(filter) => {
            let rows: Vec<Vec<String>> = client.treatments(filter).await?.iter().map(|t| vec![
                t.id.to_string(),
                t.name.clone(),
                t.duration.to_string(),
                format_price_br(&t.price),
                if t.is_active { "yes".into() } else { "no".into() },
            ]).collect();
            render_table(&["id", "name", "minutes", "price", "active"], &rows)
        }
        Command::TreatmentEdit(id, form) => {
            client.update_treatment(*id, form).await?;
            success(cmd)
        }
        Command::Equipment(filter) => {
            let rows: Vec<Vec<String>> = client.equipment(filter).await?.iter().map(|e| vec![
                e.id.to_string(),
                e.name.clone(),
                equipment_status_label(e.status).to_string(),
                if e.is_active { "yes".into() } else { "no".into() },
            ]).collect();
            render_table(&["id", "name", "status", "active"], &rows)
        }
        Command::EquipmentEdit { id, name, description, status } => {
            // keep the active flag the server last reported
            let is_active = client.equipment("").await?.iter().find(|e| e.id == *id).map(|e| e.is_active).unwrap_or(true);
            let form = EquipmentForm { name: name.clone(), description: description.clone(), status: status.clone(), is_active };
            client.update_equipment(*id, &form).await?;
            success(cmd)
        }
        Command::Feedback { unread } => render_feedback(&client.feedback(*unread).await?),
        Command::FeedbackToggle(id) => {
            let f = find_feedback(client, *id).await?;
            client.toggle_feedback_read(&f).await?;
            format!("Feedback {} marked as {}", id, if f.readed { "unread" } else { "read" })
        }
        Command::FeedbackDelete(id) => {
            client.delete_feedback(*id).await?;
            format!("Feedback {} deleted", id)
        }
        Command::ProfileEdit(form) => {
            client.save_profile(form).await?;
            success(cmd)
        }
        Command::Help => USAGE.to_string(),
        Command::Quit => return Ok(None),
    };
    Ok(Some(out))
}

fn success(cmd: &Command) -> String {
    Alert::success(cmd.operation()).map(|a| a.to_string()).unwrap_or_else(|| "Done".to_string())
}

/// Interactive loop over `input` until `quit` or end of input. Returns how many
/// commands were executed.
async fn repl<R: AsyncBufRead + Unpin>(client: &ClinicClient, input: R) -> usize {
    let mut lines = input.lines();
    let mut stdout = io::stdout();
    let mut executed = 0;
    println!("clinica interpreter. Type 'help' for commands.");
    loop {
        print!("> ");
        let _ = stdout.flush();
        let input = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) | Err(_) => break,
        };
        let words = match split_words(input.trim()) {
            Ok(w) if w.is_empty() => continue,
            Ok(w) => w,
            Err(e) => { eprintln!("{}", e); continue; }
        };
        let cmd = match parse_command(&words) {
            Ok(c) => c,
            Err(e) => { eprintln!("{}", e); continue; }
        };
        match execute(client, &cmd).await {
            Ok(Some(text)) => println!("{}", text),
            Ok(None) => break,
            Err(e) => eprintln!("{}", Alert::failure(cmd.operation(), &e)),
        }
        executed += 1;
    }
    executed
}

/// Binary entry point. Returns the process exit code: 1 on failure, 2 on usage errors.
pub async fn run(args: &[String]) -> i32 {
    let inv = match parse_args(args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return 2;
        }
    };
    if inv.help {
        println!("{}", USAGE);
        return 0;
    }

    let cmd = if inv.repl {
        None
    } else {
        match parse_command(&inv.command) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("{}\n\n{}", e, USAGE);
                return 2;
            }
        }
    };

    let cfg = inv.resolve_config(|k| std::env::var(k).ok());
    debug!(base_url = %cfg.base_url, state_dir = %cfg.state_dir.display(), ephemeral = inv.ephemeral, "starting");
    let opened = if inv.ephemeral { ClinicClient::ephemeral(&cfg) } else { ClinicClient::open(&cfg) };
    let client = match opened {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", Alert::new("Error".to_string(), e.to_string()));
            return 1;
        }
    };

    match cmd {
        None => {
            repl(&client, BufReader::new(tokio::io::stdin())).await;
            0
        }
        Some(cmd) => match execute(&client, &cmd).await {
            Ok(text) => {
                if let Some(text) = text { println!("{}", text); }
                0
            }
            Err(e) => {
                eprintln!("{}", Alert::failure(cmd.operation(), &e));
                1
            }
        },
    }
}
