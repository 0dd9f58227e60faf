//! # Veinstone Economy
//!
//! Per-block mining rewards and area effects for a prison-mine economy.
//!
//! ## Design Principles
//!
//! 1. **One event, one pass** - Each mined block is processed synchronously, start to finish
//! 2. **Typed enchantments** - Stored string keys are validated once, at the boundary
//! 3. **Collaborators behind traits** - World, ledger and sinks are owned by the host
//! 4. **External configuration** - All balance data in TOML files
//! 5. **Saturating arithmetic** - Extreme levels clamp at `u64::MAX` instead of wrapping
//!
//! ## Randomness
//!
//! Every event draws from its own `ChaCha8Rng`, seeded from a server secret,
//! the player, the tick and a nonce. Rolls are unpredictable to clients and
//! replayable by the server.
//!
//! ## Example
//!
//! ```rust,ignore
//! use veinstone_economy::{EnchantEngine, EngineConfig, BlockMined};
//!
//! let mut engine = EnchantEngine::new(EngineConfig::load("veinstone.toml")?, &secret)?;
//! let outcome = engine.on_block_mined(&mut profile, &event, &ctx);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::all)]
#![deny(clippy::perf)]

pub mod area;
pub mod books;
pub mod collaborators;
pub mod combustion;
pub mod config;
pub mod enchantment;
pub mod engine;
pub mod error;
pub mod fortune;
pub mod greed;
pub mod inventory;
pub mod processor;
pub mod profile;
pub mod rng;
pub mod router;
pub mod upgrade;

pub use area::{AreaEffectEngine, AreaEffectKind, AreaReport, AttackEvent, EffectInvocation, TornadoRegistry};
pub use books::BookEnchantmentActivationManager;
pub use collaborators::{Currency, MiningContext, Notice};
pub use combustion::{CombustionAbundanceModifier, RewardMultipliers};
pub use config::EngineConfig;
pub use enchantment::{Category, CostCurve, EnchantmentDefinition, EnchantmentId, EnchantmentRegistry};
pub use engine::{AdminRequest, AdminResponse, EnchantEngine};
pub use error::{EnchantError, EnchantResult};
pub use fortune::FortuneYieldCalculator;
pub use greed::{GreedChannel, GreedPass, GreedPayout, GreedRewardCalculator};
pub use inventory::{ItemKind, ItemStack, KeyRarity, SlotInventory};
pub use processor::{BlockMined, MiningEventProcessor, MiningOutcome};
pub use profile::{AbundanceState, PlayerId, PlayerMiningProfile};
pub use rng::RollSeeder;
pub use router::{BlockDelivery, OutputRouter, RouteOutcome};
pub use upgrade::{UpgradeCostCalculator, UpgradeQuote};
