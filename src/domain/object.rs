/// World objects (Key, Boots, Chest) and the registry that holds them.
///
/// An object never mutates the game directly. Touching it yields a list of
/// `Effect`s that `sim::step` applies in order.

use super::audio::SoundId;
use super::geometry::{Hitbox, Rect};
use super::screen::ScreenState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ObjectKind {
    Key,
    Boots,
    Chest { open: bool },
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Key => "Key",
            ObjectKind::Boots => "Boots",
            ObjectKind::Chest { .. } => "Chest",
        }
    }
}

/// What a reaction may ask the game to do.
#[derive(Clone, PartialEq, Debug)]
pub enum Effect {
    RemoveSelf,
    AddKey,
    BoostSpeed(f32),
    OpenChest,
    PlaySound(SoundId),
    StopMusic,
    ShowMessage(String),
    ChangeScreen(ScreenState),
}

/// Player facts a reaction is allowed to read.
#[derive(Clone, Copy, Debug)]
pub struct ContactContext {
    pub keys: u32,
    pub required_keys: u32,
    pub boost_multiplier: f32,
}

#[derive(Clone, Debug)]
pub struct GameObject {
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
    pub hitbox: Hitbox,
    collidable: bool,
}

impl GameObject {
    /// Object placed on a tile; its hitbox covers that whole tile.
    pub fn at_tile(kind: ObjectKind, col: i32, row: i32, tile_size: i32) -> Self {
        GameObject {
            kind,
            x: col * tile_size,
            y: row * tile_size,
            hitbox: Hitbox::full_tile(tile_size),
            collidable: matches!(kind, ObjectKind::Chest { .. }),
        }
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn world_hitbox(&self) -> Rect {
        self.hitbox.at(self.x, self.y)
    }

    pub fn on_player_contact(&self, ctx: &ContactContext) -> Vec<Effect> {
        match self.kind {
            ObjectKind::Key => vec![
                Effect::PlaySound(SoundId::PickUpKey),
                Effect::RemoveSelf,
                Effect::AddKey,
                Effect::ShowMessage("You got a key!".into()),
            ],
            ObjectKind::Boots => vec![
                Effect::PlaySound(SoundId::PowerUp),
                Effect::RemoveSelf,
                Effect::BoostSpeed(ctx.boost_multiplier),
                Effect::ShowMessage("Speed up!".into()),
            ],
            ObjectKind::Chest { open: true } => Vec::new(),
            ObjectKind::Chest { open: false } if ctx.keys >= ctx.required_keys => vec![
                Effect::StopMusic,
                Effect::PlaySound(SoundId::Victory),
                Effect::ChangeScreen(ScreenState::Ending),
                Effect::OpenChest,
            ],
            ObjectKind::Chest { open: false } => {
                let remaining = ctx.required_keys - ctx.keys;
                let plural = if remaining > 1 { "s" } else { "" };
                vec![Effect::ShowMessage(format!(
                    "You need {remaining} more key{plural} to open the chest!"
                ))]
            }
        }
    }

    pub fn open(&mut self) {
        if let ObjectKind::Chest { open } = &mut self.kind {
            *open = true;
        }
    }
}

/// Ordered object collection. Indices are stable until a removal.
#[derive(Clone, Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<GameObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, obj: GameObject) {
        self.objects.push(obj);
    }

    pub fn remove(&mut self, index: usize) -> Option<GameObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&GameObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        self.objects.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: ContactContext = ContactContext { keys: 0, required_keys: 4, boost_multiplier: 1.5 };

    #[test]
    fn only_chest_is_collidable() {
        assert!(!GameObject::at_tile(ObjectKind::Key, 1, 1, 48).is_collidable());
        assert!(!GameObject::at_tile(ObjectKind::Boots, 1, 1, 48).is_collidable());
        assert!(GameObject::at_tile(ObjectKind::Chest { open: false }, 1, 1, 48).is_collidable());
    }

    #[test]
    fn at_tile_covers_tile() {
        let o = GameObject::at_tile(ObjectKind::Key, 2, 3, 48);
        assert_eq!(o.world_hitbox(), Rect::new(96, 144, 48, 48));
    }

    #[test]
    fn key_is_consumed() {
        let o = GameObject::at_tile(ObjectKind::Key, 0, 0, 48);
        let fx = o.on_player_contact(&CTX);
        assert!(fx.contains(&Effect::RemoveSelf));
        assert!(fx.contains(&Effect::AddKey));
        assert!(fx.contains(&Effect::PlaySound(SoundId::PickUpKey)));
    }

    #[test]
    fn locked_chest_reports_missing_keys() {
        let o = GameObject::at_tile(ObjectKind::Chest { open: false }, 0, 0, 48);
        let ctx = ContactContext { keys: 3, ..CTX };
        assert_eq!(
            o.on_player_contact(&ctx),
            vec![Effect::ShowMessage("You need 1 more key to open the chest!".into())]
        );
        assert_eq!(
            o.on_player_contact(&CTX),
            vec![Effect::ShowMessage("You need 4 more keys to open the chest!".into())]
        );
    }

    #[test]
    fn chest_opens_with_enough_keys() {
        let o = GameObject::at_tile(ObjectKind::Chest { open: false }, 0, 0, 48);
        let ctx = ContactContext { keys: 4, ..CTX };
        let fx = o.on_player_contact(&ctx);
        assert!(fx.contains(&Effect::ChangeScreen(ScreenState::Ending)));
        assert!(fx.contains(&Effect::OpenChest));
        assert!(!fx.contains(&Effect::RemoveSelf));
    }

    #[test]
    fn registry_remove_out_of_range() {
        let mut reg = ObjectRegistry::new();
        reg.push(GameObject::at_tile(ObjectKind::Key, 0, 0, 48));
        assert!(reg.remove(5).is_none());
        assert!(reg.remove(0).is_some());
        assert!(reg.is_empty());
    }
}
