/**
 * CMS Client - Command Line Entry Point
 *
 * Thin front end over a Session: every invocation opens the local cache,
 * restores the stored credential, runs one command and waits for its
 * background sync before exiting.
 */

use cms_client::client::{
    citizen_directory, status_counts, visible_complaints, ComplaintFilter, Config, PendingSync,
    Session, WriteOutcome,
};
use cms_client::shared::{AppConfig, ComplaintCategory, ComplaintStatus, NewComplaint, NewOfficer, User};
use std::error::Error;

const USAGE: &str = "\
Usage: cms-client [--config <file>] <command> [args]

Commands:
  login <email> <password>
  register <name> <email> <password>
  logout
  list [--status <status>] [--search <text>]
  counts
  submit <title> <category> <location> <description>
  status <complaint-id> <status> [remarks]
  assign <complaint-id> <officer-id>
  delete <complaint-id>
  officers [add <name> <email> [id] | remove <id>]
  citizens";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(&mut args)?;

    let Some(command) = args.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    tracing::debug!("[CLI] Using API {}", config.api_base_url());
    let session = Session::open(config).await?;
    let result = run(&session, &command, rest).await;

    // Queued cache writes must land before the process exits
    session.cache().flush().await?;
    result
}

fn load_config(args: &mut Vec<String>) -> Result<Config, Box<dyn Error>> {
    let base = match args.iter().position(|arg| arg == "--config") {
        Some(index) => {
            let path = args.get(index + 1).cloned().ok_or("--config needs a file")?;
            args.drain(index..=index + 1);
            AppConfig::from_file(&path)?
        }
        None => AppConfig::default(),
    };
    Ok(Config::from_env_with(base)?)
}

async fn run(session: &Session, command: &str, args: &[String]) -> Result<(), Box<dyn Error>> {
    let sync = session.synchronizer();

    match (command, args) {
        ("login", [email, password]) => {
            let user = session.login(email, password).await?;
            println!("Signed in as {} ({})", user.name, user.role);
        }
        ("register", [name, email, password]) => {
            let message = session.register(name, email, password).await?;
            println!("{}", message);
        }
        ("logout", []) => {
            session.logout();
            println!("Signed out");
        }
        ("list", options) => {
            let user = signed_in(session)?;
            let filter = parse_filter(options)?;
            session.reload().await;

            let complaints = sync.complaints();
            let visible = visible_complaints(&complaints, &user);
            for complaint in visible.into_iter().filter(|c| filter.matches(c)) {
                println!(
                    "{:<40} {:<12} {:<12} {} @ {}{}",
                    complaint.id,
                    complaint.status,
                    complaint.category,
                    complaint.title,
                    complaint.location,
                    complaint
                        .officer_name
                        .as_ref()
                        .map(|name| format!(" -> {}", name))
                        .unwrap_or_default()
                );
            }
        }
        ("counts", []) => {
            let user = signed_in(session)?;
            session.reload().await;
            let complaints = sync.complaints();
            let counts = status_counts(visible_complaints(&complaints, &user));
            println!(
                "total {} | pending {} | in-progress {} | resolved {}",
                counts.total, counts.pending, counts.in_progress, counts.resolved
            );
        }
        ("submit", [title, category, location, description]) => {
            let user = signed_in(session)?;
            let data = NewComplaint::new(
                title.as_str(),
                ComplaintCategory::parse_lenient(category),
                location.as_str(),
                description.as_str(),
            );
            data.validate()?;
            report(sync.add_complaint(data, &user)).await?;
        }
        ("status", [id, status, remarks @ ..]) => {
            let user = signed_in(session)?;
            let status: ComplaintStatus = status.parse()?;
            let remarks = (!remarks.is_empty()).then(|| remarks.join(" "));
            report(sync.update_status(id.as_str(), status, remarks, &user)).await?;
        }
        ("assign", [complaint_id, officer_id]) => {
            signed_in(session)?;
            report(sync.assign_officer(complaint_id.as_str(), officer_id.as_str())).await?;
        }
        ("delete", [id]) => {
            signed_in(session)?;
            report(sync.delete_complaint(id.as_str())).await?;
        }
        ("officers", []) => {
            for officer in sync.officers() {
                println!(
                    "{:<40} {:<24} {:<28} {} assigned",
                    officer.id, officer.name, officer.email, officer.assigned_complaints
                );
            }
        }
        ("officers", [action, name, email, id @ ..]) if action == "add" => {
            let mut data = NewOfficer::new(name.as_str(), email.as_str());
            if let Some(id) = id.first() {
                data = data.with_id(id.as_str());
            }
            data.validate()?;
            let officer = sync.add_officer(data);
            println!("Added officer {}", officer.id);
        }
        ("officers", [action, id]) if action == "remove" => {
            if sync.remove_officer(id.as_str()) {
                println!("Removed officer {}", id);
            } else {
                println!("No officer {}", id);
            }
        }
        ("citizens", []) => {
            for citizen in citizen_directory(&sync.complaints()) {
                println!("{:<40} {:<24} {} complaints", citizen.id, citizen.name, citizen.complaint_count);
            }
        }
        _ => return Err(format!("Unknown command or arguments\n\n{}", USAGE).into()),
    }

    Ok(())
}

fn signed_in(session: &Session) -> Result<User, Box<dyn Error>> {
    session
        .current_user()
        .ok_or_else(|| "Not signed in. Run `cms-client login <email> <password>` first.".into())
}

fn parse_filter(options: &[String]) -> Result<ComplaintFilter, Box<dyn Error>> {
    let mut filter = ComplaintFilter::new();
    let mut options = options.iter();
    while let Some(option) = options.next() {
        let value = options.next().ok_or_else(|| format!("{} needs a value", option))?;
        match option.as_str() {
            "--status" => filter = filter.with_status(value.parse()?),
            "--search" => filter = filter.with_search(value.as_str()),
            other => return Err(format!("Unknown option {}", other).into()),
        }
    }
    Ok(filter)
}

async fn report(pending: PendingSync<WriteOutcome>) -> Result<(), Box<dyn Error>> {
    let outcome = pending.wait().await?;
    let id = outcome.id.as_ref().map(|id| id.to_string()).unwrap_or_default();

    match (outcome.success, outcome.synced) {
        (true, true) => println!("Synced {}", id),
        (true, false) => println!(
            "Saved locally {} ({})",
            id,
            outcome.message.as_deref().unwrap_or("not synced")
        ),
        (false, _) => {
            return Err(outcome.message.unwrap_or_else(|| "Operation failed".to_string()).into())
        }
    }
    Ok(())
}
