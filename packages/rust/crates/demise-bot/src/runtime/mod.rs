//! Interaction runtime wiring (ingress + command routing + startup recovery).

mod config;
mod dispatch;
mod ingress;
mod parsing;
mod reply;
mod run;
mod signature;

pub use config::{DEFAULT_INGRESS_BIND, DEFAULT_INGRESS_PATH, DemiseRuntimeConfig};
pub use dispatch::InteractionRouter;
pub use ingress::{
    DEMISE_INGRESS_SECRET_HEADER, DemiseIngressApp, IngressAuth, build_interactions_app,
};
pub use parsing::{CommandInvocation, InboundInteraction, interaction_handle, parse_interaction};
pub use reply::{InteractionReply, InteractionResponse};
pub use run::{run_discord_ingress, run_recovery_scan};
pub use signature::{
    DISCORD_SIGNATURE_HEADER, DISCORD_TIMESTAMP_HEADER, InteractionVerifier, PublicKeyError,
};
