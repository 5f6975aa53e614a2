use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use thiserror::Error;

use crate::logging::{Logger, TracingLogger};

use super::Question;

/// Something an actor can do, such as calling a REST API.
pub trait Ability: Any + Send + Sync {}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("actor {actor} does not have the ability {ability}")]
pub struct AbilityMissing {
    pub actor: String,
    pub ability: &'static str,
}

pub struct Actor {
    name: String,
    abilities: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    logger: Arc<dyn Logger>,
}

impl Actor {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            logger: Arc::new(TracingLogger::new(name.clone())),
            name,
            abilities: HashMap::new(),
        }
    }

    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Grants an ability, replacing any earlier one of the same type.
    pub fn who_can<A: Ability>(mut self, ability: A) -> Self {
        self.can(ability);
        self
    }

    pub fn can<A: Ability>(&mut self, ability: A) -> &mut Self {
        self.abilities.insert(TypeId::of::<A>(), Box::new(ability));
        self
    }

    pub fn has<A: Ability>(&self) -> bool {
        self.abilities.contains_key(&TypeId::of::<A>())
    }

    pub fn using<A: Ability>(&self) -> Result<&A, AbilityMissing> {
        self.abilities
            .get(&TypeId::of::<A>())
            .and_then(|ability| ability.downcast_ref::<A>())
            .ok_or_else(|| AbilityMissing {
                actor: self.name.clone(),
                ability: type_name::<A>(),
            })
    }

    pub async fn asks_for<Q: Question>(&self, question: &Q) -> Q::Answer {
        question.ask(self).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("abilities", &self.abilities.len())
            .finish()
    }
}
