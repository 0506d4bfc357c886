//! Session loop and command routing.

use crate::traits::Channel;
use adjutant_agent::CodeAgent;
use adjutant_core::{
    parse, parse_directive, Command, Directive, ExecutionRequest, ExecutionResult,
    RuntimeConfig,
};
use adjutant_executor::system_actions::status_snapshot;
use adjutant_executor::Dispatcher;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

const HELP_TEXT: &str = "Commands:\n\
  open application <name|path|uri>   launch an application\n\
  open multiple applications <a, b>  launch several, comma-separated\n\
  close application <process name>   terminate matching processes\n\
  delete file <path>                 delete a file (no undo)\n\
  run command <shell line>           run a raw shell command\n\
  list processes                     show running processes\n\
  system analysis                    CPU/memory/disk/battery report\n\
  disk usage                         per-disk usage report\n\
  clean temp files                   sweep the temp directory\n\
Directives:\n\
  /help /status /model [name] /web /bluetooth /agent /clear /exit\n\
Anything else is sent to the code agent as a natural-language request.";

/// Routes parsed commands to the executor or the code agent and runs the
/// per-session loop.
///
/// Shared state (model selection, listener flags) is explicit and lives
/// here, initialized once at startup.
pub struct Router {
    dispatcher: Arc<Dispatcher>,
    agent: Arc<CodeAgent>,
    config: Arc<RuntimeConfig>,
    model: RwLock<String>,
    web_started: AtomicBool,
    serial_started: AtomicBool,
}

enum Flow {
    Continue,
    Exit,
}

impl Router {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        agent: Arc<CodeAgent>,
        config: Arc<RuntimeConfig>,
    ) -> Arc<Self> {
        let model = config.model.clone();
        Arc::new(Self {
            dispatcher,
            agent,
            config,
            model: RwLock::new(model),
            web_started: AtomicBool::new(false),
            serial_started: AtomicBool::new(false),
        })
    }

    pub fn current_model(&self) -> String {
        self.model.read().clone()
    }

    pub fn set_model(&self, name: &str) {
        *self.model.write() = name.to_string();
    }

    /// Parse one line and resolve it to a result. Structured commands win;
    /// everything else is treated as a generation prompt.
    pub async fn route_line(&self, channel: &str, line: &str) -> ExecutionResult {
        let request = ExecutionRequest::new(channel, parse(line));
        self.route(request).await
    }

    /// Resolve a request. Exactly one result per request: both branches
    /// fold every failure into the returned value.
    pub async fn route(&self, request: ExecutionRequest) -> ExecutionResult {
        match &request.command {
            Command::AgentGenerate(goal) | Command::Unknown(goal) => {
                let model = self.current_model();
                info!(
                    request = %request.id,
                    channel = %request.channel,
                    "routing to code agent"
                );
                self.agent.generate_and_run(goal, &model).await
            }
            _ => self.dispatcher.execute(&request).await,
        }
    }

    /// Run one channel session to completion.
    ///
    /// Strictly sequential within the session: the next line is not read
    /// until the previous result has been delivered. A disconnect ends
    /// only this session.
    pub async fn serve(self: Arc<Self>, mut channel: Box<dyn Channel>) {
        let name = channel.name().to_string();
        info!(channel = %name, "session opened");
        let mut agent_mode = false;

        while let Some(line) = channel.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            if let Some(directive) = parse_directive(&line) {
                let (reply, flow) = self.handle_directive(directive, &mut agent_mode).await;
                if let Some(reply) = reply {
                    if channel.send(&reply).await.is_err() {
                        warn!(channel = %name, "delivery failed; dropping reply");
                        break;
                    }
                }
                if matches!(flow, Flow::Exit) {
                    break;
                }
                continue;
            }

            let result = if agent_mode {
                self.route(ExecutionRequest::new(
                    &name,
                    Command::AgentGenerate(line.clone()),
                ))
                .await
            } else {
                self.route_line(&name, &line).await
            };

            if channel.send(&result.render()).await.is_err() {
                warn!(channel = %name, "delivery failed; dropping result");
                break;
            }
        }

        info!(channel = %name, "session closed");
    }

    async fn handle_directive(
        self: &Arc<Self>,
        directive: Directive,
        agent_mode: &mut bool,
    ) -> (Option<String>, Flow) {
        match directive {
            Directive::Help => (Some(HELP_TEXT.to_string()), Flow::Continue),
            Directive::Status => {
                let reply = match status_snapshot().await {
                    Ok(snapshot) => snapshot.render(),
                    Err(e) => format!("status capture failed: {}", e),
                };
                (Some(reply), Flow::Continue)
            }
            Directive::Model(None) => (
                Some(format!("current model: {}", self.current_model())),
                Flow::Continue,
            ),
            Directive::Model(Some(name)) => {
                self.set_model(&name);
                (Some(format!("model set to {}", name)), Flow::Continue)
            }
            Directive::Web => {
                let reply = self.start_web_listener();
                (Some(reply), Flow::Continue)
            }
            Directive::Bluetooth => {
                let reply = self.start_serial_listener();
                (Some(reply), Flow::Continue)
            }
            Directive::Agent => {
                *agent_mode = !*agent_mode;
                let reply = if *agent_mode {
                    "agent mode on: every line now goes to the code agent (/agent to leave)"
                } else {
                    "agent mode off"
                };
                (Some(reply.to_string()), Flow::Continue)
            }
            Directive::Clear => (Some("\x1B[2J\x1B[1;1H".to_string()), Flow::Continue),
            Directive::Exit => (Some("goodbye".to_string()), Flow::Exit),
            Directive::Unrecognized(head) => (
                Some(format!("unknown directive {}; try /help", head)),
                Flow::Continue,
            ),
        }
    }

    pub fn start_web_listener(self: &Arc<Self>) -> String {
        let port = self.config.http_port;
        if self.web_started.swap(true, Ordering::SeqCst) {
            return format!("web listener already running on port {}", port);
        }
        let router = self.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::http::serve(router.clone(), port).await {
                warn!("web listener failed: {}", e);
                router.web_started.store(false, Ordering::SeqCst);
            }
        });
        format!("web listener started on http://0.0.0.0:{}", port)
    }

    pub fn start_serial_listener(self: &Arc<Self>) -> String {
        let port = self.config.serial_port;
        if self.serial_started.swap(true, Ordering::SeqCst) {
            return format!("serial bridge already running on port {}", port);
        }
        let router = self.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::serial::serve(router.clone(), port).await {
                warn!("serial bridge failed: {}", e);
                router.serial_started.store(false, Ordering::SeqCst);
            }
        });
        format!("serial bridge started on port {}", port)
    }
}
