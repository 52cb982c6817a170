//! Per-session request tracking and paced emission.
//!
//! Each session has at most one live request. Its emitter renders one step,
//! sends it, waits the configured delay and checks its cancel signal before the
//! next step, so a superseded or disconnected request stops at a step boundary.

use crate::config::RelayConfig;
use crate::protocol::{Inbound, Outbound};
use dashmap::DashMap;
use mathboard_core::{error_record, render_step, Step};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Why an emitter was told to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cancel {
    Superseded,
    Disconnected,
}

#[derive(Debug)]
struct Session {
    generation: u64,
    request_id: String,
    cancel: watch::Sender<Option<Cancel>>,
}

#[derive(Clone)]
pub struct Relay {
    config: Arc<RelayConfig>,
    sessions: Arc<DashMap<String, Session>>,
    generations: Arc<AtomicU64>,
    out: mpsc::UnboundedSender<Outbound>,
}

impl Relay {
    pub fn new(config: RelayConfig, out: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(DashMap::new()),
            generations: Arc::new(AtomicU64::new(0)),
            out,
        }
    }

    /// Number of sessions with a live request.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Handles one inbound message, returning the emitter task it started, if any.
    pub fn handle(&self, message: Inbound) -> Option<JoinHandle<()>> {
        match message {
            Inbound::RequestMath {
                session,
                request_id,
                steps,
            } => {
                let request_id = request_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                Some(self.start(session, request_id, steps))
            }
            Inbound::Disconnect { session } => {
                if let Some((_, old)) = self.sessions.remove(&session) {
                    log::info!("session {} disconnected during {}", session, old.request_id);
                    let _ = old.cancel.send(Some(Cancel::Disconnected));
                }
                None
            }
        }
    }

    fn start(&self, session: String, request_id: String, steps: Vec<Step>) -> JoinHandle<()> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = watch::channel(None);

        let previous = self.sessions.insert(
            session.clone(),
            Session {
                generation,
                request_id: request_id.clone(),
                cancel,
            },
        );
        if let Some(old) = previous {
            log::info!(
                "session {}: request {} supersedes {}",
                session,
                request_id,
                old.request_id
            );
            let _ = old.cancel.send(Some(Cancel::Superseded));
        }

        let relay = self.clone();
        tokio::spawn(async move {
            relay
                .emit(session, request_id, generation, steps, cancelled)
                .await
        })
    }

    async fn emit(
        self,
        session: String,
        request_id: String,
        generation: u64,
        steps: Vec<Step>,
        mut cancelled: watch::Receiver<Option<Cancel>>,
    ) {
        let total = steps.len();
        let mut emitted = 0;

        if total == 0 {
            log::warn!("request {} has no steps", request_id);
            self.send(Outbound::DisplayStep {
                session: session.clone(),
                record: error_record(&request_id),
            });
            emitted = 1;
        }

        for (i, step) in steps.iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.step_delay()) => {}
                    _ = cancelled.changed() => {}
                }
            }

            let reason = *cancelled.borrow();
            match reason {
                Some(Cancel::Superseded) => {
                    self.send(Outbound::RequestSuperseded {
                        session,
                        request_id,
                        emitted,
                    });
                    return;
                }
                Some(Cancel::Disconnected) => return,
                None => {}
            }

            let record = render_step(&request_id, step, i + 1, total, &self.config.engine);
            self.send(Outbound::DisplayStep {
                session: session.clone(),
                record,
            });
            emitted += 1;
        }

        self.sessions
            .remove_if(&session, |_, live| live.generation == generation);
        self.send(Outbound::RequestComplete {
            session,
            request_id,
            emitted,
        });
    }

    fn send(&self, message: Outbound) {
        if self.out.send(message).is_err() {
            log::debug!("output closed; dropping message");
        }
    }
}
