/*!
# MCP DevKit - Utilitaires de test pour le hub et les clients

Bibliothèque facilitant les tests d'intégration avec:
- Un hub réel sur port éphémère (TestHarness)
- Des endpoints de panne (connexion refusée, serveur muet)
- Un builder d'enveloppes, valides ou volontairement incomplètes
*/

pub mod envelope;
pub mod test_utils;

pub use envelope::EnvelopeBuilder;
pub use test_utils::{dead_endpoint, wait_until, SilentEndpoint, TestHarness};
