use crate::component::Component;
use chunkform_core::{Compound, Error, Namespaced, Result, Tag};

/// A free-moving object inside a chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    namespace: String,
    base_name: String,
    position: [f64; 3],
    data: Compound,
}

impl Entity {
    /// Create an entity at `position`
    pub fn new(
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        position: [f64; 3],
        data: Compound,
    ) -> Self {
        Entity {
            namespace: namespace.into(),
            base_name: base_name.into(),
            position,
            data,
        }
    }

    /// World position
    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Version-specific payload
    pub fn data(&self) -> &Compound {
        &self.data
    }

    fn to_tag(&self) -> Tag {
        let mut root = Compound::new();
        root.insert("namespace", self.namespace.as_str());
        root.insert("base_name", self.base_name.as_str());
        root.insert(
            "pos",
            Tag::List(self.position.iter().map(|&c| Tag::Double(c)).collect()),
        );
        root.insert("data", self.data.clone());
        Tag::Compound(root)
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let root = tag
            .as_compound()
            .ok_or_else(|| Error::mismatch("entity is not a compound"))?;
        let pos = root.require_list("pos")?;
        if pos.len() != 3 {
            return Err(Error::mismatch(format!(
                "entity position has {} coordinates",
                pos.len()
            )));
        }
        let mut position = [0.0; 3];
        for (axis, c) in pos.iter().enumerate() {
            position[axis] = c
                .as_f64()
                .ok_or_else(|| Error::mismatch("entity coordinate is not a float"))?;
        }
        Ok(Entity::new(
            root.require_str("namespace")?,
            root.require_str("base_name")?,
            position,
            root.require_compound("data")?.clone(),
        ))
    }
}

impl Namespaced for Entity {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_name(&self) -> &str {
        &self.base_name
    }
}

/// Entity list (`e`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityComponent {
    entities: Vec<Entity>,
}

impl EntityComponent {
    /// Empty entity list
    pub fn new() -> Self {
        EntityComponent::default()
    }

    /// Append an entity
    pub fn push(&mut self, entity: Entity) -> Result<()> {
        check_position(&entity)?;
        self.entities.push(entity);
        Ok(())
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn check_position(entity: &Entity) -> Result<()> {
    if entity.position.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(Error::mismatch(format!(
            "entity {} has non-finite position {:?}",
            entity.namespaced_id(),
            entity.position
        )))
    }
}

impl Component for EntityComponent {
    const STORAGE_KEY: &'static str = "e";
    type Value = Vec<Entity>;

    fn get(&self) -> &Vec<Entity> {
        &self.entities
    }

    fn set(&mut self, value: Vec<Entity>) -> Result<()> {
        value.iter().try_for_each(check_position)?;
        self.entities = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        Tag::List(self.entities.iter().map(Entity::to_tag).collect())
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let list = tag.as_list().ok_or_else(|| {
            Error::mismatch(format!("component 'e' is {}, expected list", tag.kind()))
        })?;
        let mut component = EntityComponent::new();
        component.set(list.iter().map(Entity::from_tag).collect::<Result<_>>()?)?;
        Ok(component)
    }
}
