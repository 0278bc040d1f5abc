use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use okto_plugin::logger::{self, LogConfig, LogFormat};
use okto_plugin::{Content, LlmAgentRuntime, Memory, OktoPlugin, PluginConfig};

/// 通过自然语言操作 Okto 钱包
#[derive(Debug, Parser)]
#[command(name = "okto-plugin", version, about)]
struct Cli {
    /// 只处理这一条消息后退出
    #[arg(short, long)]
    message: Option<String>,

    /// 跳过关键词路由，直接使用指定动作（名称或别名）
    #[arg(long)]
    action: Option<String>,

    /// pretty | compact | json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    #[arg(long, default_value = "cli")]
    room: String,

    #[arg(long, env = "AGENT_NAME", default_value = "okto-agent")]
    agent_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(LogConfig {
        format: cli.log_format,
        ..Default::default()
    });

    let config = PluginConfig::from_env()?;
    info!(
        environment = %config.environment,
        gateway = %config.gateway_url(),
        swa = %logger::Sanitizer::address(&config.client_swa),
        client_key = %logger::Sanitizer::private_key(&config.client_private_key),
        openai_key = %config.llm.api_key.as_deref().map(logger::Sanitizer::api_key).unwrap_or_default(),
        "starting okto plugin"
    );

    let runtime = Arc::new(LlmAgentRuntime::new(
        cli.agent_name.clone(),
        config.llm.clone(),
        config.context_limit,
    )?);
    let plugin = OktoPlugin::from_config(&config)?;
    info!(
        plugin = plugin.name(),
        actions = ?plugin.registry().names(),
        "{}",
        plugin.description()
    );

    // 等待登录完成后再处理消息
    if let Err(e) = plugin.service().initialize().await {
        error!("authentication task aborted: {}", e);
    }

    let session = Session {
        plugin,
        runtime,
        room: cli.room.clone(),
        agent_name: cli.agent_name.clone(),
    };

    if let Some(text) = cli.message.as_deref() {
        session.handle(text, cli.action.as_deref()).await;
        return Ok(());
    }

    println!("Okto wallet agent. Type a request, or 'exit' to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        session.handle(line, cli.action.as_deref()).await;
    }

    info!("bye");
    Ok(())
}

struct Session {
    plugin: OktoPlugin,
    runtime: Arc<LlmAgentRuntime>,
    room: String,
    agent_name: String,
}

impl Session {
    async fn handle(&self, text: &str, action: Option<&str>) {
        let message = Memory::new(self.room.clone(), "user", text);

        let runtime = Arc::clone(&self.runtime);
        let room = self.room.clone();
        let agent = self.agent_name.clone();
        let callback = move |content: Content| {
            println!("{}", content.text);
            runtime.remember(Memory::new(room.clone(), agent.clone(), content.text));
        };

        match self
            .plugin
            .dispatch(self.runtime.as_ref(), &message, action, Some(&callback))
            .await
        {
            Ok(Some(result)) => info!(success = result.success, response = %result.response, "action finished"),
            Ok(None) => {
                self.runtime.remember(message);
                let names = self.plugin.registry().names().join(", ");
                println!("No Okto action matched. Available actions: {}", names);
            }
            Err(e) => {
                warn!("dispatch failed: {}", e);
                println!("{}", e);
            }
        }
    }
}
