use dns_by_eye_application::ports::NameserverQuery;
use dns_by_eye_application::use_cases::{CrossReferenceUseCase, TraceDelegationUseCase};
use dns_by_eye_domain::TracerConfig;
use dns_by_eye_infrastructure::dns::UdpNameserverQuery;
use std::sync::Arc;

pub struct TracerServices {
    pub trace: TraceDelegationUseCase,
    pub cross_reference: CrossReferenceUseCase,
}

impl TracerServices {
    pub fn new(config: &TracerConfig) -> anyhow::Result<Self> {
        let query: Arc<dyn NameserverQuery> = Arc::new(UdpNameserverQuery::new());

        Ok(Self {
            trace: TraceDelegationUseCase::new(Arc::clone(&query), config)?,
            cross_reference: CrossReferenceUseCase::new(query, config)?,
        })
    }
}
