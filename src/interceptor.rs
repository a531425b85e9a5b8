use serde::Serialize;

use crate::config::{MailerSettings, ProviderConfig};
use crate::email::{self, DeliveryOutcome, HttpTransport};
use crate::host::{self, CapturedState, MailHost};
use crate::message::Recipient;

/// What the host should do with its message once the hook returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Relay disabled or unconfigured; the host message was never touched.
    PassThrough,
    /// Delivered by the provider; the host must not send it again.
    Suppress,
    /// Provider failed and fallback is off; the message is dropped.
    Block { reason: String },
    /// Provider failed and fallback is on; the host sends the restored
    /// message through its native path.
    RestoreAndProceedNative { state: CapturedState, reason: String },
}

impl Decision {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::PassThrough | Self::RestoreAndProceedNative { .. })
    }
}

/// Payload of the send-failed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendFailure {
    pub to: Vec<Recipient>,
    pub subject: String,
    pub reason: String,
}

type FailureListener = Box<dyn Fn(&SendFailure)>;

/// Reroutes host mail through the provider, one message per call.
///
/// Settings and transport are fixed at construction; nothing is shared
/// between send cycles.
pub struct MailInterceptor<T: HttpTransport> {
    settings: MailerSettings,
    provider: ProviderConfig,
    transport: T,
    listeners: Vec<FailureListener>,
}

impl<T: HttpTransport> MailInterceptor<T> {
    pub fn new(settings: MailerSettings, transport: T) -> Self {
        let provider = settings.provider_config();
        Self {
            settings,
            provider,
            transport,
            listeners: Vec::new(),
        }
    }

    /// Register a fire-and-forget observer for failed provider sends.
    pub fn on_send_failed<F>(&mut self, listener: F)
    where
        F: Fn(&SendFailure) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// True when this cycle should be rerouted at all.
    pub fn is_active(&self) -> bool {
        if !self.settings.enabled {
            return false;
        }
        if !self.provider_has_key() {
            log::warn!("[mailer] Resend API key is not set, using the native mailer");
            return false;
        }
        true
    }

    fn provider_has_key(&self) -> bool {
        !self.provider.api_key.is_empty()
    }

    /// Run the host hook for one message: capture, suppress, send, then
    /// commit, restore or block.
    pub fn handle(&self, mail: &mut dyn MailHost) -> Decision {
        if !self.is_active() {
            return Decision::PassThrough;
        }

        let state = CapturedState::capture(&*mail);
        host::suppress(mail);

        let decision = self.decide(state);
        apply(&decision, mail);
        decision
    }

    /// Send a captured message and choose its fate. Failure listeners run
    /// before the decision is returned; from `handle` that is after
    /// suppression and before the decision is applied.
    pub(crate) fn decide(&self, state: CapturedState) -> Decision {
        let message = state.to_outbound(&self.settings.from_email, &self.settings.from_name);

        let reason = match email::send(&self.provider, &message, &self.transport) {
            DeliveryOutcome::Success => {
                log::info!(
                    "[mailer] Sent via Resend to {} recipient(s): {:?}",
                    message.to.len(),
                    message.subject
                );
                return Decision::Suppress;
            }
            DeliveryOutcome::Failure(reason) => reason,
        };

        self.emit(&SendFailure {
            to: state.to.clone(),
            subject: state.subject.clone(),
            reason: reason.clone(),
        });

        if self.settings.fallback_enabled {
            log::warn!(
                "[mailer] Sending via Resend failed ({}). Falling back to the native mailer.",
                reason
            );
            Decision::RestoreAndProceedNative { state, reason }
        } else {
            log::error!(
                "[mailer] Sending via Resend failed ({}). Fallback is disabled, message blocked.",
                reason
            );
            Decision::Block { reason }
        }
    }

    fn emit(&self, failure: &SendFailure) {
        for listener in &self.listeners {
            listener(failure);
        }
    }
}

/// Apply a decision to the host message.
pub fn apply(decision: &Decision, mail: &mut dyn MailHost) {
    match decision {
        Decision::PassThrough => {}
        Decision::Suppress => host::suppress(mail),
        Decision::Block { .. } => host::block(mail),
        Decision::RestoreAndProceedNative { state, .. } => host::restore(mail, state),
    }
}
