use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::tier::DifficultyTier;

static POOL_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/pools");

#[derive(Deserialize, Clone, Debug)]
struct PoolFile {
    name: String,
    symbols: Vec<String>,
}

/// Candidate target characters for one tier. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPool {
    symbols: Vec<char>,
}

impl SymbolPool {
    /// Builds a pool keeping first-seen order and dropping duplicates,
    /// whitespace and control characters.
    pub fn new<I>(tier: DifficultyTier, symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        let mut unique: Vec<char> = Vec::new();
        for c in symbols {
            if c.is_whitespace() || c.is_control() || unique.contains(&c) {
                continue;
            }
            unique.push(c);
        }

        if unique.is_empty() {
            return Err(Error::EmptyPool(tier));
        }

        Ok(Self { symbols: unique })
    }

    /// Pool shipped with the binary for `tier`.
    pub fn builtin(tier: DifficultyTier) -> Result<Self> {
        let file_name = format!("{tier}.json");
        let file = POOL_DIR
            .get_file(&file_name)
            .ok_or_else(|| Error::PoolData(format!("{file_name} not found")))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::PoolData(format!("{file_name} is not utf-8")))?;
        let parsed: PoolFile = serde_json::from_str(contents)?;

        if parsed.name != tier.to_string() {
            return Err(Error::PoolData(format!(
                "{file_name} declares pool '{}'",
                parsed.name
            )));
        }

        let mut chars = Vec::with_capacity(parsed.symbols.len());
        for symbol in &parsed.symbols {
            let mut it = symbol.chars();
            match (it.next(), it.next()) {
                (Some(c), None) => chars.push(c),
                _ => {
                    return Err(Error::PoolData(format!(
                        "{file_name}: '{symbol}' is not a single character"
                    )))
                }
            }
        }

        Self::new(tier, chars)
    }

    /// Uniformly random member of the pool.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        // non-empty by construction, the fallback is never taken
        self.symbols.choose(rng).copied().unwrap_or_default()
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// One pool per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPools {
    normal: SymbolPool,
    hard: SymbolPool,
    hardcore: SymbolPool,
}

impl SymbolPools {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            normal: SymbolPool::builtin(DifficultyTier::Normal)?,
            hard: SymbolPool::builtin(DifficultyTier::Hard)?,
            hardcore: SymbolPool::builtin(DifficultyTier::Hardcore)?,
        })
    }

    /// Built-in pools with the given tiers replaced by the characters of a
    /// user-supplied string.
    pub fn with_overrides(overrides: &BTreeMap<DifficultyTier, String>) -> Result<Self> {
        let mut pools = Self::builtin()?;
        for (tier, symbols) in overrides {
            pools.set(*tier, SymbolPool::new(*tier, symbols.chars())?);
        }
        Ok(pools)
    }

    /// Same pool for every tier. Handy for deterministic setups.
    pub fn uniform(pool: SymbolPool) -> Self {
        Self {
            normal: pool.clone(),
            hard: pool.clone(),
            hardcore: pool,
        }
    }

    pub fn get(&self, tier: DifficultyTier) -> &SymbolPool {
        match tier {
            DifficultyTier::Normal => &self.normal,
            DifficultyTier::Hard => &self.hard,
            DifficultyTier::Hardcore => &self.hardcore,
        }
    }

    pub fn set(&mut self, tier: DifficultyTier, pool: SymbolPool) {
        match tier {
            DifficultyTier::Normal => self.normal = pool,
            DifficultyTier::Hard => self.hard = pool,
            DifficultyTier::Hardcore => self.hardcore = pool,
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, tier: DifficultyTier, rng: &mut R) -> char {
        self.get(tier).pick(rng)
    }
}
