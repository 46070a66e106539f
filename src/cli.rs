use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::assign::{self, log::AssignmentLog, Suggestion};
use crate::board::filter::{AssigneeFilter, IssueFilter, Priority, Status};
use crate::board::{dashboard, roadmap};
use crate::config::{self, AppConfig};
use crate::model::issue::{IssueState, IssueText, IssueUpdate, StateFilter};
use crate::providers::github::GitHubTracker;
use crate::providers::IssueTracker;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login {
        token: String,
        repository: Option<String>,
    },
    Use {
        repository: String,
    },
    Repos,
    Issues {
        filter: IssueFilter,
    },
    Add(AddArgs),
    Close {
        number: u64,
    },
    Assign {
        number: u64,
    },
    Suggest {
        title: String,
        description: Option<String>,
    },
    Roadmap {
        state: StateFilter,
    },
    Milestone {
        title: String,
        description: Option<String>,
        due: Option<NaiveDate>,
    },
    Dashboard,
    Log {
        limit: usize,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddArgs {
    pub title: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub auto_assign: bool,
}

pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "login" => match rest {
            [token] => Ok(Command::Login {
                token: token.clone(),
                repository: None,
            }),
            [token, repo] => Ok(Command::Login {
                token: token.clone(),
                repository: Some(repo.clone()),
            }),
            _ => bail!("Usage: workboard login <token> [owner/repo]"),
        },
        "use" => match rest {
            [repo] => Ok(Command::Use {
                repository: repo.clone(),
            }),
            _ => bail!("Usage: workboard use <owner/repo>"),
        },
        "repos" => Ok(Command::Repos),
        "issues" => Ok(Command::Issues {
            filter: parse_filter_args(rest)?,
        }),
        "add" => Ok(Command::Add(parse_add_args(rest)?)),
        "close" => Ok(Command::Close {
            number: parse_number(rest, "close")?,
        }),
        "assign" => Ok(Command::Assign {
            number: parse_number(rest, "assign")?,
        }),
        "suggest" => {
            let (title, description) = parse_title_args(rest)?;
            Ok(Command::Suggest { title, description })
        }
        "roadmap" => {
            let state = match rest {
                [] => StateFilter::All,
                [flag, value] if flag == "--state" => value
                    .parse::<StateFilter>()
                    .map_err(anyhow::Error::msg)?,
                _ => bail!("Usage: workboard roadmap [--state open|closed|all]"),
            };
            Ok(Command::Roadmap { state })
        }
        "milestone" => parse_milestone_args(rest),
        "dashboard" => Ok(Command::Dashboard),
        "log" => {
            let limit = match rest {
                [] => 20,
                [flag, value] if flag == "--limit" || flag == "-n" => value
                    .parse::<usize>()
                    .with_context(|| format!("Invalid limit {value:?}"))?,
                _ => bail!("Usage: workboard log [--limit <n>]"),
            };
            Ok(Command::Log { limit })
        }
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command {other:?}. Run `workboard help` for usage"),
    }
}

fn parse_number(args: &[String], command: &str) -> Result<u64> {
    match args {
        [n] => n
            .trim_start_matches('#')
            .parse()
            .with_context(|| format!("Invalid issue number {n:?}")),
        _ => bail!("Usage: workboard {command} <issue-number>"),
    }
}

/// Parse `--state`, `--priority` and `--assignee` filters. `all` disables one.
pub fn parse_filter_args(args: &[String]) -> Result<IssueFilter> {
    let mut filter = IssueFilter::default();
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .with_context(|| format!("Missing value for {flag} flag"))?;
        let all = value.eq_ignore_ascii_case("all");
        match flag {
            "--state" | "--status" | "-s" => {
                filter.status = if all {
                    None
                } else {
                    Some(value.parse::<Status>().map_err(anyhow::Error::msg)?)
                };
            }
            "--priority" | "-p" => {
                filter.priority = if all {
                    None
                } else {
                    Some(value.parse::<Priority>().map_err(anyhow::Error::msg)?)
                };
            }
            "--assignee" | "-a" => {
                filter.assignee = value.parse::<AssigneeFilter>().map_err(anyhow::Error::msg)?;
            }
            _ => bail!("Unknown filter {flag:?}"),
        }
        i += 2;
    }

    Ok(filter)
}

/// Parse `<title words> [-d <description>]`.
pub fn parse_title_args(args: &[String]) -> Result<(String, Option<String>)> {
    let add = parse_add_args(args)?;
    if !add.labels.is_empty() || add.auto_assign {
        bail!("Only a title and -d/--desc are accepted here");
    }
    Ok((add.title, add.description))
}

/// Parse `work add`-style arguments.
///
/// Supported forms:
///   workboard add "My task title"
///   workboard add My task title
///   workboard add "My task" -d "The description" -l bug -l high
///   workboard add "My task" --auto-assign
pub fn parse_add_args(args: &[String]) -> Result<AddArgs> {
    if args.is_empty() {
        bail!("Usage: workboard add <title> [-d <description>] [-l <label>]... [--auto-assign]\n\nExamples:\n  workboard add \"Fix the login bug\"\n  workboard add \"Fix the login bug\" -d \"Users can't log in with SSO\" --auto-assign");
    }

    let mut title_parts: Vec<String> = Vec::new();
    let mut parsed = AddArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--desc" | "--description" => {
                i += 1;
                if i < args.len() {
                    parsed.description = Some(args[i].clone());
                } else {
                    bail!("Missing value for -d/--desc flag");
                }
            }
            "-l" | "--label" => {
                i += 1;
                if i < args.len() {
                    parsed.labels.push(args[i].clone());
                } else {
                    bail!("Missing value for -l/--label flag");
                }
            }
            "--auto-assign" => parsed.auto_assign = true,
            _ => {
                title_parts.push(args[i].clone());
            }
        }
        i += 1;
    }

    parsed.title = title_parts.join(" ");
    if parsed.title.is_empty() {
        bail!("Issue title cannot be empty");
    }

    Ok(parsed)
}

fn parse_milestone_args(args: &[String]) -> Result<Command> {
    let mut title_parts: Vec<String> = Vec::new();
    let mut description = None;
    let mut due = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--desc" | "--description" => {
                i += 1;
                description = Some(
                    args.get(i)
                        .cloned()
                        .context("Missing value for -d/--desc flag")?,
                );
            }
            "--due" => {
                i += 1;
                let value = args.get(i).context("Missing value for --due flag")?;
                due = Some(
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .with_context(|| format!("Invalid due date {value:?}, expected YYYY-MM-DD"))?,
                );
            }
            _ => title_parts.push(args[i].clone()),
        }
        i += 1;
    }

    let title = title_parts.join(" ");
    if title.is_empty() {
        bail!("Usage: workboard milestone <title> [-d <description>] [--due YYYY-MM-DD]");
    }
    Ok(Command::Milestone {
        title,
        description,
        due,
    })
}

fn tracker_from(config: &AppConfig) -> Result<GitHubTracker> {
    let token = config
        .token()
        .context("Not logged in. Run `workboard login <token>` or set GITHUB_TOKEN")?;
    let github = config.github.clone().unwrap_or_default();
    Ok(GitHubTracker::from_config(&github, token))
}

pub async fn run(command: Command) -> Result<()> {
    if command == Command::Help {
        print_help();
        return Ok(());
    }

    let mut config = config::load_config()?;

    match command {
        Command::Help => {}
        Command::Login { token, repository } => {
            let github = config.github.clone().unwrap_or_default();
            let tracker = GitHubTracker::from_config(&github, token.clone());
            let login = tracker
                .current_user()
                .await
                .context("Token was rejected by GitHub")?;

            let github = config.github_mut();
            github.token = token;
            if let Some(repo) = repository {
                let (owner, repo) = config::parse_repository(&repo)?;
                github.owner = Some(owner);
                github.repo = Some(repo);
            }
            config::save_config(&config)?;
            println!("Logged in as {login}");
        }
        Command::Use { repository } => {
            let (owner, repo) = config::parse_repository(&repository)?;
            let github = config.github_mut();
            github.owner = Some(owner.clone());
            github.repo = Some(repo.clone());
            config::save_config(&config)?;
            println!("Using {owner}/{repo}");
        }
        Command::Repos => {
            let tracker = tracker_from(&config)?;
            for repo in tracker.list_repositories().await? {
                let visibility = if repo.private { "private" } else { "public" };
                match repo.description {
                    Some(desc) => println!("{} ({visibility}) — {desc}", repo.full_name),
                    None => println!("{} ({visibility})", repo.full_name),
                }
            }
        }
        Command::Issues { filter } => {
            let tracker = tracker_from(&config)?;
            let state = match filter.status {
                Some(Status::Closed) => StateFilter::Closed,
                Some(_) => StateFilter::Open,
                None => StateFilter::All,
            };
            let issues = tracker.list_issues(state).await?;
            let shown = filter.apply(&issues);
            if shown.is_empty() {
                println!("No issues match");
            }
            for issue in shown {
                let priority = Priority::of(issue)
                    .map(|p| format!(" [{p}]"))
                    .unwrap_or_default();
                let assignee = if issue.assignees.is_empty() {
                    "unassigned".to_string()
                } else {
                    issue.assignees.join(", ")
                };
                println!(
                    "#{:<5} {:<11} {}{priority} — {assignee}",
                    issue.number,
                    Status::of(issue),
                    issue.title
                );
            }
        }
        Command::Add(add) => {
            let tracker = tracker_from(&config)?;
            let body = add.description.unwrap_or_default();
            let issue = tracker.create_issue(&add.title, &body, &add.labels).await?;
            println!("Created #{} — {}", issue.number, issue.title);
            if let Some(url) = &issue.url {
                println!("  {url}");
            }
            if add.auto_assign {
                let log = AssignmentLog::default();
                let outcome = assign::auto_assign_issue(&tracker, &config, &log, &issue).await?;
                print_assignment(outcome.issue_number, &outcome.suggestion);
            }
        }
        Command::Close { number } => {
            let tracker = tracker_from(&config)?;
            let update = IssueUpdate {
                state: Some(IssueState::Closed),
                ..Default::default()
            };
            let issue = tracker.update_issue(number, &update).await?;
            println!("Closed #{} — {}", issue.number, issue.title);
        }
        Command::Assign { number } => {
            let tracker = tracker_from(&config)?;
            let log = AssignmentLog::default();
            let outcome = assign::auto_assign(&tracker, &config, &log, number).await?;
            print_assignment(outcome.issue_number, &outcome.suggestion);
        }
        Command::Suggest { title, description } => {
            let tracker = tracker_from(&config)?;
            let text = IssueText::new(&title, description.as_deref().unwrap_or_default());
            let suggestion = assign::suggest(&tracker, &config, &text).await?;
            print_ranking(&suggestion);
            match &suggestion.assignee {
                Some(login) => println!("Suggested assignee: {login}"),
                None => println!("No suitable assignee"),
            }
        }
        Command::Roadmap { state } => {
            let tracker = tracker_from(&config)?;
            let milestones = tracker.list_milestones(state).await?;
            if milestones.is_empty() {
                println!("No milestones");
            }
            for entry in roadmap::build_roadmap(&milestones) {
                let due = entry
                    .milestone
                    .due_on
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "no due date".into());
                println!(
                    "{:<30} {:>3}%  {:<11} {due}",
                    entry.milestone.title, entry.progress, entry.status
                );
                if let Some(desc) = &entry.milestone.description {
                    println!("    {desc}");
                }
            }
        }
        Command::Milestone {
            title,
            description,
            due,
        } => {
            let tracker = tracker_from(&config)?;
            let due_on = due.map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")));
            let milestone = tracker
                .create_milestone(
                    &title,
                    description.as_deref().unwrap_or_default(),
                    due_on.as_deref(),
                )
                .await?;
            println!("Created milestone {} — {}", milestone.number, milestone.title);
        }
        Command::Dashboard => {
            let tracker = tracker_from(&config)?;
            let issues = tracker.list_issues(StateFilter::All).await?;
            let milestones = tracker.list_milestones(StateFilter::All).await?;
            let summary = dashboard::summarize(&issues, &milestones, chrono::Utc::now());

            println!("Open issues:        {}", summary.open);
            println!("In progress:        {}", summary.in_progress);
            println!("Closed issues:      {}", summary.closed);
            println!("Unassigned (open):  {}", summary.unassigned_open);
            println!("Open milestones:    {}", summary.open_milestones);
            if let Some((title, due)) = &summary.next_due {
                println!("Next due:           {title} ({})", due.format("%Y-%m-%d"));
            }
            if !summary.per_assignee.is_empty() {
                println!();
                println!("Workload:");
                for (login, count) in &summary.per_assignee {
                    println!("  {login:<20} {count}");
                }
            }
        }
        Command::Log { limit } => {
            let events = AssignmentLog::default().read(Some(limit));
            if events.is_empty() {
                println!("No assignments recorded");
            }
            for event in events {
                let who = event.assignee.as_deref().unwrap_or("-");
                let detail = event.message.as_deref().unwrap_or_default();
                println!(
                    "{}  #{:<5} {:<9} {who:<16} {detail}",
                    event.timestamp, event.issue_number, event.event
                );
            }
        }
    }

    Ok(())
}

fn print_ranking(suggestion: &Suggestion) {
    if suggestion.ranking.is_empty() {
        println!("No collaborators to rank");
        return;
    }
    println!("{:<20} {:>7} {:>7} {:>7}  skills", "login", "skill", "avail", "total");
    for ranked in &suggestion.ranking {
        println!(
            "{:<20} {:>7.1} {:>7.1} {:>7.1}  {}",
            ranked.login,
            ranked.skill_match_score,
            ranked.workload_score,
            ranked.total_score,
            ranked.matched_skills.join(", ")
        );
    }
}

fn print_assignment(number: u64, suggestion: &Suggestion) {
    match &suggestion.assignee {
        Some(login) => println!("Assigned #{number} to {login}"),
        None => match suggestion.best() {
            Some(best) => println!(
                "Left #{number} unassigned (best: {} at {:.1})",
                best.login, best.total_score
            ),
            None => println!("Left #{number} unassigned (no collaborators)"),
        },
    }
}

pub fn print_help() {
    println!("workboard — GitHub issues, roadmap and auto-assignment\n");
    println!("USAGE:");
    println!("  workboard login <token> [owner/repo]   Verify and store a personal access token");
    println!("  workboard use <owner/repo>             Select the repository");
    println!("  workboard repos                        List your repositories");
    println!("  workboard issues [filters]             List issues");
    println!("  workboard add <title> [options]        Create an issue");
    println!("  workboard close <number>               Close an issue");
    println!("  workboard assign <number>              Auto-assign an open issue");
    println!("  workboard suggest <title> [-d desc]    Rank the team for an issue");
    println!("  workboard roadmap [--state s]          Show milestones");
    println!("  workboard milestone <title> [options]  Create a milestone");
    println!("  workboard dashboard                    Project summary");
    println!("  workboard log [--limit n]              Recent auto-assignments");
    println!();
    println!("FILTERS:");
    println!("  --state open|in-progress|closed|all");
    println!("  --priority high|medium|low|all");
    println!("  --assignee <login>|unassigned|all");
    println!();
    println!("ADD OPTIONS:");
    println!("  -d, --desc <text>   Set a description");
    println!("  -l, --label <name>  Add a label (repeatable)");
    println!("  --auto-assign       Pick an assignee by skills and workload");
    println!();
    println!("MILESTONE OPTIONS:");
    println!("  -d, --desc <text>   Set a description");
    println!("  --due YYYY-MM-DD    Set a due date");
}
