//! The simulation loop.
//!
//! A single tokio task owns the [`World`] and the session map. Wall-clock
//! time is polled on a coarse interval, accumulated, and drained in fixed
//! steps, so the simulation advances deterministically regardless of
//! scheduler jitter — how often the clock is checked is decoupled from how
//! large a physics step is taken. Connection events interleave between
//! ticks over an mpsc channel.

use std::collections::HashMap;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use vtt_ecs::{movement, Appearance, EntityCursor, Movement, Transform2D, World, WorldError};
use vtt_net::{ClientMessage, ServerMessage};

use crate::config::ServerConfig;
use crate::session::{Session, SessionEvent};

/// Upper bound on fixed steps drained per clock poll. A long stall (debugger
/// pause, suspended host) drops the backlog instead of replaying it.
const MAX_STEPS_PER_POLL: u32 = 8;

/// Fixed-timestep accumulator.
#[derive(Debug)]
pub struct FixedStep {
    step: Duration,
    acc: Duration,
}

impl FixedStep {
    /// Create an accumulator draining in steps of `step`.
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            acc: Duration::ZERO,
        }
    }

    /// Account for `elapsed` wall-clock time and return how many fixed steps
    /// to run, capped at [`MAX_STEPS_PER_POLL`], plus whether any accumulated
    /// time was discarded by the cap.
    pub fn advance(&mut self, elapsed: Duration) -> (u32, bool) {
        self.acc += elapsed;
        let mut steps = 0;
        while self.acc >= self.step {
            self.acc -= self.step;
            steps += 1;
            if steps == MAX_STEPS_PER_POLL {
                let dropped = self.acc > Duration::ZERO;
                self.acc = Duration::ZERO;
                return (steps, dropped);
            }
        }
        (steps, false)
    }
}

/// Fixed seed for the demo scenario, so every run lays out the same table.
const SEED: u64 = 0x9e37_79b9;

const TOKEN_COLORS: [&str; 6] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46f0f0",
];

/// The simulation server: world, sessions, and the tick loop.
pub struct SimServer {
    config: ServerConfig,
    world: World,
    sessions: HashMap<String, Session>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SimServer {
    /// Create the server and seed the demo scenario.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CapacityExceeded`] if `tokens` exceeds the
    /// world capacity.
    pub fn new(
        config: ServerConfig,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Result<Self, WorldError> {
        let mut server = Self {
            world: World::new(config.capacity),
            sessions: HashMap::new(),
            events,
            config,
        };
        server.seed_tokens()?;
        Ok(server)
    }

    /// Number of currently connected sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Populate the world with bouncing demo tokens, deterministically.
    fn seed_tokens(&mut self) -> Result<(), WorldError> {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let spread = self.config.bound * 0.9;
        for i in 0..self.config.tokens {
            let id = self.world.create()?;
            self.world.transforms_mut().add(
                id,
                Transform2D::at(
                    rng.gen_range(-spread..=spread),
                    rng.gen_range(-spread..=spread),
                ),
            );
            self.world.movements_mut().add(
                id,
                Movement::velocity(rng.gen_range(-60.0..=60.0), rng.gen_range(-60.0..=60.0)),
            );
            self.world.appearances_mut().add(
                id,
                Appearance {
                    sprite: (i % 4) as i32,
                    color: Some(TOKEN_COLORS[i as usize % TOKEN_COLORS.len()].to_string()),
                    ..Appearance::default()
                },
            );
        }
        Ok(())
    }

    /// Run until the event channel closes (all connection tasks and the
    /// listener are gone).
    pub async fn run(mut self) {
        let step = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let dt = step.as_secs_f64() as f32;
        let mut fixed = FixedStep::new(step);
        let mut poll = tokio::time::interval(Duration::from_millis(self.config.poll_ms));
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        info!(
            tick_rate = self.config.tick_rate,
            poll_ms = self.config.poll_ms,
            entities = self.world.alive_count(),
            "simulation loop started"
        );

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    let now = Instant::now();
                    let (steps, dropped) = fixed.advance(now - last);
                    last = now;
                    if dropped {
                        warn!(steps, "tick backlog clamped; simulation time was dropped");
                    }
                    for _ in 0..steps {
                        self.step(dt);
                    }
                    if steps > 0 {
                        self.broadcast();
                    }
                }
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.apply_event(event),
                        None => break,
                    }
                }
            }
        }

        info!("simulation loop stopped");
    }

    /// One fixed simulation step: integrate, then bounce off the table edge.
    fn step(&mut self, dt: f32) {
        movement::integrate(&mut self.world, dt);
        self.bounce();
    }

    /// Reflect tokens off the square bound: an entity outside the bound and
    /// still heading outward has that axis of its velocity negated.
    fn bounce(&mut self) {
        let bound = self.config.bound;
        let mut cursor = EntityCursor::new();
        while let Some(id) = cursor.next(&self.world) {
            let (Some(t), Some(m)) = (self.world.transforms().get(id), self.world.movements().get(id))
            else {
                continue;
            };
            let mut vx = m.vx;
            let mut vy = m.vy;
            if (t.x > bound && vx > 0.0) || (t.x < -bound && vx < 0.0) {
                vx = -vx;
            }
            if (t.y > bound && vy > 0.0) || (t.y < -bound && vy < 0.0) {
                vy = -vy;
            }
            if vx != m.vx || vy != m.vy {
                self.world.movements_mut().set_velocity(id, vx, vy);
            }
        }
    }

    /// Apply one connection event between ticks.
    fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected { session } => {
                info!(client = %session.id, "session registered");
                if let Err(e) = session.transport.send(&ServerMessage::Hello {
                    tick_rate: self.config.tick_rate,
                }) {
                    debug!(client = %session.id, error = %e, "handshake send failed");
                }
                self.sessions.insert(session.id.clone(), session);
            }
            SessionEvent::Message { id, msg } => {
                let Some(session) = self.sessions.get_mut(&id) else {
                    return;
                };
                match msg {
                    ClientMessage::Camera {
                        cx,
                        cy,
                        span_x,
                        span_y,
                    } => {
                        session.viewport.merge(cx, cy, span_x, span_y);
                        debug!(client = %id, viewport = ?session.viewport, "viewport updated");
                    }
                    ClientMessage::Resync => {
                        session.sync.reset();
                        session.needs_snapshot = true;
                        info!(client = %id, "resync requested");
                    }
                }
            }
            SessionEvent::Disconnected { id } => {
                if self.sessions.remove(&id).is_some() {
                    info!(client = %id, "session removed");
                }
            }
        }
    }

    /// Send each session its AOI-filtered view of this tick: a delta, or a
    /// full snapshot right after connect/resync. A closed or failing
    /// transport skips that client for this tick only; the disconnect event
    /// cleans it up.
    fn broadcast(&mut self) {
        for session in self.sessions.values_mut() {
            if !session.transport.is_open() {
                continue;
            }
            let delta = session.sync.update(&self.world, &session.viewport);
            let msg = if session.needs_snapshot {
                session.needs_snapshot = false;
                ServerMessage::Snapshot(session.sync.snapshot())
            } else {
                ServerMessage::Delta(delta)
            };
            if let Err(e) = session.transport.send(&msg) {
                debug!(client = %session.id, error = %e, "send failed; skipping client this tick");
            }
        }
    }
}
