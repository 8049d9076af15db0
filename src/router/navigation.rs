//! NavigationRouter - maps one token to one screen plus its mutations.
//!
//! The router keeps no state between calls. Everything it knows comes from
//! the catalog snapshot and the user's persisted partitions, so any number
//! of tokens from any number of users can be routed concurrently.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::catalog::CatalogStore;
use crate::config::{AppConfig, ReminderOption};
use crate::error::{RouteError, StoreResult};
use crate::pagination::paginate;
use crate::router::token::{ListSource, Token};
use crate::router::view::{Notice, ReminderLine, Transition, ViewDescriptor};
use crate::state::UserStateStore;
use crate::types::{AirdropRecord, Frequency, UserIdentity};

pub struct NavigationRouter {
    catalog: Arc<CatalogStore>,
    users: Arc<dyn UserStateStore>,
    page_size: NonZeroUsize,
    reminders_shown: usize,
    reminder_options: Vec<ReminderOption>,
    reminder_labels: Vec<String>,
}

impl NavigationRouter {
    pub fn new(
        catalog: Arc<CatalogStore>,
        users: Arc<dyn UserStateStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            catalog,
            users,
            page_size: config.page_size,
            reminders_shown: config.reminders_shown,
            reminder_labels: config
                .reminder_options
                .iter()
                .map(|option| option.label.clone())
                .collect(),
            reminder_options: config.reminder_options.clone(),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    /// Parse a raw token against the configured reminder labels.
    pub fn parse(&self, raw: &str) -> Result<Token, RouteError> {
        Ok(Token::parse(raw, self.reminder_labels.as_slice())?)
    }

    /// Parse and route a raw token.
    pub async fn handle(&self, user: &UserIdentity, raw: &str) -> Result<Transition, RouteError> {
        let token = self.parse(raw)?;
        Ok(self.route(user, &token).await?)
    }

    /// Route a raw token, turning failures into what the user should see:
    /// a malformed token changes nothing, a storage failure shows the
    /// generic error screen.
    pub async fn dispatch(&self, user: &UserIdentity, raw: &str) -> Transition {
        match self.handle(user, raw).await {
            Ok(transition) => transition,
            Err(RouteError::MalformedToken(e)) => {
                debug!(user = %user, token = raw, error = %e, "Ignoring malformed token");
                Transition::unchanged()
            }
            Err(RouteError::Storage(e)) => {
                error!(user = %user, token = raw, error = %e, "Mutation failed");
                Transition::with_notice(ViewDescriptor::ErrorGeneric, Notice::Failed)
            }
        }
    }

    /// Compute the next screen for `token`, applying the mutations it implies.
    #[instrument(skip(self, user, token), fields(user = %user, token = %token))]
    pub async fn route(&self, user: &UserIdentity, token: &Token) -> StoreResult<Transition> {
        let transition = match token {
            Token::List { source, page } => {
                Transition::to(self.drops_list(user, *source, *page).await)
            }
            Token::BackToDrops { page } => {
                Transition::to(self.drops_list(user, ListSource::All, *page).await)
            }

            Token::Detail(id) => match self.catalog.get_by_id(id) {
                Some(record) => Transition::to(self.detail(user, record).await),
                None => Transition::to(ViewDescriptor::NotFound),
            },

            Token::WishlistAdd(id) => {
                let Some(record) = self.catalog.get_by_id(id) else {
                    return Ok(Transition::notice(Notice::NotFound));
                };
                self.users.add_to_wishlist(user, &record.id).await?;
                let notice = Notice::AddedToWishlist {
                    title: record.title.clone(),
                };
                Transition::with_notice(self.detail(user, record).await, notice)
            }

            Token::WishlistRemove(id) => {
                let Some(record) = self.catalog.get_by_id(id) else {
                    return Ok(Transition::notice(Notice::NotFound));
                };
                self.users.remove_from_wishlist(user, &record.id).await?;
                let notice = Notice::RemovedFromWishlist {
                    title: record.title.clone(),
                };
                Transition::with_notice(self.detail(user, record).await, notice)
            }

            Token::ReminderOptions(id) => match self.catalog.get_by_id(id) {
                Some(record) => Transition::to(ViewDescriptor::ReminderOptions {
                    record,
                    options: self.reminder_options.clone(),
                }),
                None => Transition::notice(Notice::NotFound),
            },

            Token::SetReminder { airdrop_id, label } => {
                let Some(record) = self.catalog.get_by_id(airdrop_id) else {
                    return Ok(Transition::notice(Notice::NotFound));
                };
                let entry = self
                    .users
                    .append_reminder(user, &record.id, label, Frequency::Once)
                    .await?;
                let notice = Notice::ReminderSet {
                    title: record.title.clone(),
                    remind_time: entry.remind_time,
                };
                Transition::with_notice(self.detail(user, record).await, notice)
            }

            Token::Reminders => Transition::to(self.reminders_overview(user).await),
            Token::Help => Transition::to(ViewDescriptor::Help),
            Token::Refresh | Token::BackToMain => Transition::to(ViewDescriptor::MainMenu),
        };

        debug!("Routed");
        Ok(transition)
    }

    async fn drops_list(
        &self,
        user: &UserIdentity,
        source: ListSource,
        page: i64,
    ) -> ViewDescriptor {
        let wishlist = match source {
            ListSource::Mine => Some(self.users.load_wishlist(user).await),
            _ => None,
        };
        let snapshot = self.catalog.snapshot();

        let candidates: Vec<&AirdropRecord> = match (&wishlist, source) {
            (Some(wishlist), _) => wishlist
                .ids()
                .iter()
                .filter_map(|id| snapshot.get(id))
                .collect(),
            (None, ListSource::Hot) => snapshot
                .records()
                .iter()
                .filter(|record| record.is_hot())
                .collect(),
            (None, _) => snapshot.records().iter().collect(),
        };

        if candidates.is_empty() {
            return ViewDescriptor::EmptyList { source };
        }

        let (items, page_info) = paginate(&candidates, page, self.page_size);
        ViewDescriptor::DropsList {
            source,
            page: page_info.current_page,
            items: items.iter().copied().cloned().collect(),
            page_info,
        }
    }

    /// Detail screen, with wishlist membership read fresh from the store.
    async fn detail(&self, user: &UserIdentity, record: AirdropRecord) -> ViewDescriptor {
        let is_wishlisted = self.users.load_wishlist(user).await.contains(&record.id);
        let banner = self.catalog.banner_path(&record).await;
        ViewDescriptor::AirdropDetail {
            record,
            is_wishlisted,
            banner,
        }
    }

    /// The most recent log window, skipping entries whose airdrop is gone.
    async fn reminders_overview(&self, user: &UserIdentity) -> ViewDescriptor {
        let log = self.users.load_reminders(user).await;
        let snapshot = self.catalog.snapshot();
        let window_start = log.len().saturating_sub(self.reminders_shown);

        let entries = log[window_start..]
            .iter()
            .filter_map(|entry| {
                snapshot.get(&entry.airdrop_id).map(|record| ReminderLine {
                    title: record.title.clone(),
                    entry: entry.clone(),
                })
            })
            .collect();

        ViewDescriptor::RemindersList {
            entries,
            total_logged: log.len(),
        }
    }
}
