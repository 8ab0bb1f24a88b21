use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Days, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use application::{NotificationCenter, OrderBook, ScanAction, SessionStore, spawn_auto_refresh};
use domain::analytics::{MAX_WINDOW_DAYS, growth_rates};
use domain::validation::RegistrationForm;
use domain::{Notifier, SessionAnalytics, SessionGateway, SessionWithDetails, TariffPlan};
use infrastructure::{
    CompositeNotifier, FrontDeskConfig, LoggingSoundPlayer, SqliteSessionGateway, TracingNotifier,
};

use crate::cli::Command;

/// Everything a front desk process needs, wired from configuration
pub struct FrontDesk {
    config: FrontDeskConfig,
    gateway: Arc<SqliteSessionGateway>,
    store: Arc<SessionStore>,
    notifications: Arc<NotificationCenter>,
    orders: OrderBook,
}

impl FrontDesk {
    pub async fn connect(config: FrontDeskConfig) -> Result<Self> {
        info!(database_url = %config.database_url, "Connecting to storage");
        let gateway = Arc::new(
            SqliteSessionGateway::new(&config.database_url)
                .await
                .context("Failed to open session database")?,
        );
        if config.seed_tariffs {
            gateway.seed_default_tariffs().await?;
        }
        Ok(Self::with_gateway(config, gateway))
    }

    pub fn with_gateway(config: FrontDeskConfig, gateway: Arc<SqliteSessionGateway>) -> Self {
        let notifications = Arc::new(NotificationCenter::new(config.notifications.max_retained));
        notifications.set_enabled(config.notifications.enabled);

        let notifier: Arc<dyn Notifier> = Arc::new(CompositeNotifier::new(vec![
            notifications.clone() as Arc<dyn Notifier>,
            Arc::new(TracingNotifier) as Arc<dyn Notifier>,
        ]));
        let mut sound = LoggingSoundPlayer::new(config.sound.enabled);
        if config.sound.bell {
            sound = sound.with_bell();
        }

        let store = Arc::new(
            SessionStore::new(gateway.clone(), notifier).with_sound_player(Arc::new(sound)),
        );

        Self {
            config,
            gateway,
            store,
            notifications,
            orders: OrderBook::new(),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn notifications(&self) -> &Arc<NotificationCenter> {
        &self.notifications
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Serve => self.serve().await,
            Command::Scan { code } => self.scan(&code).await,
            Command::Register {
                code,
                parent_name,
                parent_phone,
                tariff,
                child_name,
                email,
            } => {
                let tariff_plan_id = self.resolve_tariff(&tariff).await?.id;
                let form = RegistrationForm {
                    bracelet_code: code,
                    parent_name,
                    parent_phone,
                    parent_email: email.unwrap_or_default(),
                    child_name: child_name.unwrap_or_default(),
                    tariff_plan_id,
                };
                self.register(&form).await
            }
            Command::End { session_id } => self.end(&session_id).await,
            Command::Sessions { query } => self.sessions(query.as_deref()).await,
            Command::Quote {
                session_id,
                products,
            } => self.quote(&session_id, &products).await,
            Command::Tariffs => self.tariffs().await,
            Command::Report { days } => self.report(days).await,
        }
    }

    async fn serve(&self) -> Result<()> {
        self.store.load().await?;
        let inside = self.store.inside_count().await;
        let total = self.store.total_count().await;
        info!(inside, total, "✅ Front desk ready");

        let listener = self.notifications.subscribe(|list| {
            if let Some(latest) = list.first() {
                let unread = list.iter().filter(|n| !n.read).count();
                debug!(id = latest.id, unread, "Notification posted");
            }
        });

        let cancel = CancellationToken::new();
        let period = Duration::from_secs(self.config.refresh_interval_secs.max(1));
        let refresh = spawn_auto_refresh(self.store.clone(), period, cancel.clone());

        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("🛑 Shutting down..."),
            Err(err) => warn!(error = %err, "Unable to listen for shutdown signal"),
        }

        cancel.cancel();
        self.store.shutdown();
        self.notifications.unsubscribe(listener);
        if let Err(e) = refresh.await {
            warn!(error = %e, "Auto-refresh task ended abnormally");
        }
        Ok(())
    }

    async fn scan(&self, code: &str) -> Result<()> {
        self.store.load().await?;
        let outcome = self.store.scan(code).await?;

        match (outcome.action, outcome.session) {
            (ScanAction::New, _) => {
                println!("{code}: not registered, register it first");
            }
            (action, Some(session)) => {
                let verb = if action == ScanAction::Enter { "entered" } else { "exited" };
                println!(
                    "{} {} ({}, session {})",
                    session.child_display_name(),
                    verb,
                    session.bracelet_code(),
                    session.id()
                );
            }
            (_, None) => return Err(anyhow!("scan of {code} returned no session")),
        }
        Ok(())
    }

    async fn register(&self, form: &RegistrationForm) -> Result<()> {
        self.store.load().await?;
        let session = self.store.register(form).await?;
        println!(
            "Registered {} for {} (session {})",
            session.bracelet_code(),
            session.child_display_name(),
            session.id()
        );
        Ok(())
    }

    async fn end(&self, session_id: &str) -> Result<()> {
        self.store.load().await?;
        self.store.end_session(session_id).await?;
        println!("Session {session_id} ended");
        Ok(())
    }

    async fn sessions(&self, query: Option<&str>) -> Result<()> {
        self.store.load().await?;
        if let Some(query) = query {
            self.store.search(query).await?;
        }

        let now = Utc::now();
        for session in self.store.filtered().await {
            print_session(&session, now);
        }
        let inside = self.store.inside_count().await;
        let total = self.store.total_count().await;
        println!("{inside} inside / {total} total");
        Ok(())
    }

    async fn quote(&self, session_id: &str, products: &[String]) -> Result<()> {
        let session = self
            .gateway
            .find_session(session_id)
            .await?
            .ok_or_else(|| anyhow!("session {session_id} not found"))?;

        self.orders.open_draft(session_id);
        for product_id in products {
            let product = self
                .orders
                .find_product(product_id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown product {product_id}"))?;
            self.orders.add_product(session_id, product);
        }
        self.orders.commit(session_id);

        println!(
            "{:<24} {:>8.2}",
            session.tariff_name().unwrap_or("Unknown"),
            session.price()
        );
        for line in self.orders.lines(session_id) {
            println!(
                "{:<20} x{:<2} {:>8.2}",
                line.product.name,
                line.quantity,
                line.line_total()
            );
        }
        println!("{:<24} {:>8.2}", "Total", self.orders.session_total(&session));
        Ok(())
    }

    async fn tariffs(&self) -> Result<()> {
        for plan in self.gateway.list_tariff_plans().await? {
            println!(
                "{:<38} {:<10} {:>4}h {:>8.2}",
                plan.id, plan.name, plan.duration_hours, plan.price
            );
        }
        Ok(())
    }

    async fn report(&self, days: u32) -> Result<()> {
        let days = days.clamp(1, MAX_WINDOW_DAYS);
        let now = Utc::now();
        // Both windows plus a day of slack for the local offset
        let since = now
            .checked_sub_days(Days::new(u64::from(days) * 2 + 1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let sessions = self.gateway.sessions_since(since).await?;

        let analytics = SessionAnalytics::local();
        let (current, previous) = analytics.split_periods(&sessions, days, now);
        debug!(days, current = current.len(), previous = previous.len(), "building report");
        let report = analytics.report_with_window(&current, days, now);
        let comparison = analytics.compare_periods(&sessions, days, now);

        let output = serde_json::json!({
            "report": report,
            "comparison": {
                "visitorChange": comparison.visitor_change,
                "revenueChange": comparison.revenue_change,
            },
            "growth": growth_rates(&current, &previous, now),
            "revenueWithProducts": self.orders.revenue_with_products(&current),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    async fn resolve_tariff(&self, id_or_name: &str) -> Result<TariffPlan> {
        self.gateway
            .list_tariff_plans()
            .await?
            .into_iter()
            .find(|t| t.id == id_or_name || t.name.eq_ignore_ascii_case(id_or_name))
            .ok_or_else(|| anyhow!("unknown tariff plan {id_or_name}"))
    }
}

fn print_session(session: &SessionWithDetails, now: chrono::DateTime<Utc>) {
    let minutes = session.elapsed_minutes(now).max(0.0) as i64;
    let overtime = if session.is_overtime(now) { " OVERTIME" } else { "" };
    println!(
        "{:<12} {:<16} {:<8} {:>3}h{:02}m {}{}",
        session.bracelet_code(),
        session.child_display_name(),
        session.status().as_str(),
        minutes / 60,
        minutes % 60,
        session.parent.formatted_phone(),
        overtime
    );
}
