//! Per-request authorization context
//!
//! [`Authorizer`] is built once per service at startup. For every inbound
//! request it validates the bearer token, loads the subject's profile and
//! returns a [`RequestAuthContext`] that business code queries for decisions.

use crate::auth::evaluator::{AccessDecision, PermissionEvaluator};
use crate::auth::filter::{CollectionFilter, CollectionFilterTranslator};
use crate::auth::jwt::{TokenValidator, extract_bearer};
use crate::core::models::{Authorizable, ResourceType, SubjectAttributes};
use crate::core::profile_cache::ProfileCache;
use crate::utils::error::{AuthzError, Result, TokenRejection};
use crate::utils::generate_request_id;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds request contexts for one service
#[derive(Clone)]
pub struct Authorizer {
    service: String,
    validator: Arc<TokenValidator>,
    cache: Arc<ProfileCache>,
    evaluator: PermissionEvaluator,
    translator: Arc<CollectionFilterTranslator>,
}

impl Authorizer {
    pub fn new(
        service: impl Into<String>,
        validator: Arc<TokenValidator>,
        cache: Arc<ProfileCache>,
        evaluator: PermissionEvaluator,
        translator: Arc<CollectionFilterTranslator>,
    ) -> Self {
        Self {
            service: service.into(),
            validator,
            cache,
            evaluator,
            translator,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Authenticate a bearer token and load the subject's profile
    ///
    /// Token failures surface as `Unauthenticated`. An unavailable attribute
    /// cache does not fail the request: the context carries an empty profile
    /// and is marked degraded, so attribute-dependent policies deny.
    pub async fn authorize_request(&self, token: &str) -> Result<RequestAuthContext> {
        let subject_id = self.validator.validate(token)?;
        let request_id = generate_request_id();

        let (subject, degraded) = match self.cache.get_profile(&subject_id, &self.service).await {
            Ok(profile) => (profile.subject, false),
            Err(AuthzError::CacheUnavailable(reason)) => {
                warn!(
                    "Request {} for {} in '{}' runs degraded: {}",
                    request_id, subject_id, self.service, reason
                );
                (SubjectAttributes::empty(subject_id, self.service.clone()), true)
            }
            Err(e) => return Err(e),
        };

        debug!(
            "Request {} authenticated as {} in '{}'",
            request_id, subject.subject_id, self.service
        );

        Ok(RequestAuthContext {
            request_id,
            subject,
            degraded,
            evaluator: self.evaluator.clone(),
            translator: self.translator.clone(),
        })
    }

    /// Like [`authorize_request`](Self::authorize_request), from an
    /// `Authorization` header value
    pub async fn authorize_header(&self, header_value: &str) -> Result<RequestAuthContext> {
        let token = extract_bearer(header_value)
            .ok_or_else(|| AuthzError::unauthenticated(TokenRejection::Invalid))?;
        self.authorize_request(token).await
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("service", &self.service)
            .field("validator", &self.validator)
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}

/// Authenticated subject plus decision helpers for one request
#[derive(Clone)]
pub struct RequestAuthContext {
    request_id: String,
    subject: SubjectAttributes,
    degraded: bool,
    evaluator: PermissionEvaluator,
    translator: Arc<CollectionFilterTranslator>,
}

impl RequestAuthContext {
    /// Context for an already resolved subject
    pub fn new(
        subject: SubjectAttributes,
        evaluator: PermissionEvaluator,
        translator: Arc<CollectionFilterTranslator>,
    ) -> Self {
        Self {
            request_id: generate_request_id(),
            subject,
            degraded: false,
            evaluator,
            translator,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn subject_id(&self) -> &str {
        self.subject.id()
    }

    pub fn subject(&self) -> &SubjectAttributes {
        &self.subject
    }

    /// True when the profile could not be loaded and is empty
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn check_access(&self, resource: &dyn Authorizable, action: &str) -> bool {
        self.evaluator.check_access(&self.subject, resource, action)
    }

    pub fn check_access_detailed(&self, resource: &dyn Authorizable, action: &str) -> AccessDecision {
        self.evaluator.check_access_detailed(&self.subject, resource, action)
    }

    /// `Ok` when allowed, `DecisionDenied` otherwise
    pub fn require(&self, resource: &dyn Authorizable, action: &str) -> Result<()> {
        let decision = self.check_access_detailed(resource, action);
        if !decision.allowed {
            debug!(
                "Request {}: {} may not {} {} {}",
                self.request_id,
                self.subject_id(),
                action,
                resource.kind(),
                resource.resource_id()
            );
        }
        decision.into_result()
    }

    /// Filter for a list query over `resource_type`
    pub fn filter(&self, resource_type: &ResourceType, action: &str) -> CollectionFilter {
        self.translator
            .filter_predicate(&self.subject, resource_type, action)
    }
}

impl fmt::Debug for RequestAuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthContext")
            .field("request_id", &self.request_id)
            .field("subject", &self.subject)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}
