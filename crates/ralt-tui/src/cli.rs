use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use ralt_core::{agent, AgentKind, ApiClient, Controller, MessageKind};

#[derive(Parser)]
#[command(name = "ralt")]
#[command(version, about = "Terminal client for the RALT multimodal agent backend")]
pub struct Cli {
    /// Backend base URL (overrides RALT_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the reply
    Send {
        /// Message text
        message: String,
        /// Agent to route the message to
        #[arg(short, long, default_value = "general")]
        agent: String,
    },
    /// List the agents the backend offers
    Agents,
    /// Show the capabilities of one agent
    Capabilities {
        /// Agent identifier, e.g. code
        agent: String,
    },
    /// Show backend status
    Status,
    /// Check backend health
    Health,
}

fn parse_agent(id: &str) -> Result<AgentKind> {
    AgentKind::parse(id).ok_or_else(|| {
        let known: Vec<&str> = agent::descriptors().iter().map(|a| a.kind.as_str()).collect();
        anyhow!("Unknown agent '{}'. Choose one of: {}", id, known.join(", "))
    })
}

pub async fn run(command: Commands, client: ApiClient) -> Result<()> {
    match command {
        Commands::Send { message, agent } => send_message(client, &message, &agent).await,
        Commands::Agents => list_agents(&client).await,
        Commands::Capabilities { agent } => show_capabilities(&client, &agent).await,
        Commands::Status => show_status(&client).await,
        Commands::Health => check_health(&client).await,
    }
}

async fn send_message(client: ApiClient, message: &str, agent_id: &str) -> Result<()> {
    let agent = parse_agent(agent_id)?;
    let mut controller = Controller::new(client);
    controller.session_mut().select_agent(agent);
    controller.session_mut().set_draft(message);

    if !controller.handle_send().await {
        return Err(anyhow!("Nothing to send: the message is empty"));
    }

    let reply = controller
        .session()
        .messages()
        .last()
        .ok_or_else(|| anyhow!("No reply recorded"))?;

    match reply.kind {
        MessageKind::Agent => {
            let mut title = format!("{}:", agent.display_name()).bold().green().to_string();
            if let Some(model) = &reply.model_used {
                title.push_str(&format!(" {}", model.dimmed()));
            }
            println!("{}", title);
            println!("{}", reply.content);
            if !reply.capabilities_used.is_empty() {
                println!("\n{} {}", "Capabilities used:".dimmed(), reply.capabilities_used.join(", "));
            }
            Ok(())
        }
        // main prints its own "Error:" label
        _ => {
            let text = reply.content.strip_prefix("Error: ").unwrap_or(&reply.content);
            Err(anyhow!("{}", text))
        }
    }
}

async fn list_agents(client: &ApiClient) -> Result<()> {
    let agents = client.get_agents().await?;

    println!("\n{}", "🤖 Available Agents".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    if agents.is_empty() {
        println!("{}", "The backend reported no agents".yellow());
        return Ok(());
    }

    for remote in agents {
        let model = remote.info.model.as_deref().unwrap_or("?");
        println!(
            "  • {} {} ({})",
            remote.id.bold().green(),
            remote.info.name,
            model.dimmed()
        );
        if !remote.info.description.is_empty() {
            println!("    {}", remote.info.description);
        }
    }

    Ok(())
}

async fn show_capabilities(client: &ApiClient, agent_id: &str) -> Result<()> {
    let capabilities = client.get_agent_capabilities(agent_id).await?;

    println!("\n{} {}", "Capabilities of".bold().blue(), agent_id.bold());
    for capability in capabilities {
        println!("  • {}", capability.green());
    }

    Ok(())
}

async fn show_status(client: &ApiClient) -> Result<()> {
    let status = client.get_status().await?;

    println!(
        "{} {} {}",
        status.service.as_deref().unwrap_or("backend").bold().blue(),
        status.version.as_deref().unwrap_or_default().dimmed(),
        status.status.as_deref().unwrap_or("unknown").green()
    );
    if let Some(description) = &status.description {
        println!("{}", description);
    }
    for feature in &status.features {
        println!("  • {}", feature);
    }
    for (name, path) in &status.endpoints {
        println!("  {} {}", format!("{:<8}", name).dimmed(), path);
    }

    Ok(())
}

async fn check_health(client: &ApiClient) -> Result<()> {
    match client.health_check().await {
        Ok(health) => {
            println!(
                "{} {} {}",
                health.status.as_deref().unwrap_or("ok").bold().green(),
                health.version.as_deref().unwrap_or_default(),
                health.timestamp.as_deref().unwrap_or_default().dimmed()
            );
            Ok(())
        }
        Err(e) => {
            println!("{}: {}", "Backend unreachable".red(), e);
            println!("Make sure the backend is running at {}", client.base_url().bold());
            Err(e.into())
        }
    }
}
