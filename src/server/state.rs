use std::sync::Arc;
use std::time::Instant;

use crate::cache::TemplateCache;
use crate::config::Settings;
use crate::mail::{MailSender, TemplateMailer};
use crate::template::{TemplateFetcher, TemplateResult};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cache: Arc<dyn TemplateCache>,
    pub fetcher: Arc<TemplateFetcher>,
    pub mailer: Arc<TemplateMailer>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        cache: Arc<dyn TemplateCache>,
        sender: Arc<dyn MailSender>,
    ) -> TemplateResult<Self> {
        let fetcher = Arc::new(TemplateFetcher::new(
            &settings.api,
            &settings.cache,
            cache.clone(),
        )?);
        let mailer = Arc::new(TemplateMailer::new(fetcher.clone(), sender));

        Ok(Self {
            settings: Arc::new(settings),
            cache,
            fetcher,
            mailer,
            start_time: Instant::now(),
        })
    }
}
