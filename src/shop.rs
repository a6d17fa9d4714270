//! Shop catalog: cosmetic skins and power-up duration upgrades

use crate::persistence::SaveManager;
use crate::platform::Storage;
use crate::sim::PowerUpKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    /// Tint applied to the player sprite (0xRRGGBB)
    pub tint: u32,
}

pub const SKINS: [Skin; 3] = [
    Skin {
        id: "default",
        name: "Classic Gassy",
        price: 0,
        tint: 0xffffff,
    },
    Skin {
        id: "toxic",
        name: "Toxic Green",
        price: 100,
        tint: 0xaa22ff,
    },
    Skin {
        id: "golden",
        name: "Golden Wind",
        price: 500,
        tint: 0xffdd00,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeOffer {
    pub kind: PowerUpKind,
    pub name: &'static str,
    pub base_price: u64,
    pub max_level: u32,
}

pub const UPGRADES: [UpgradeOffer; 2] = [
    UpgradeOffer {
        kind: PowerUpKind::Invincibility,
        name: "Invincibility Duration",
        base_price: 200,
        max_level: 5,
    },
    UpgradeOffer {
        kind: PowerUpKind::Magnet,
        name: "Magnet Duration",
        base_price: 200,
        max_level: 5,
    },
];

impl UpgradeOffer {
    pub fn for_kind(kind: PowerUpKind) -> &'static UpgradeOffer {
        match kind {
            PowerUpKind::Invincibility => &UPGRADES[0],
            PowerUpKind::Magnet => &UPGRADES[1],
        }
    }

    /// Price of the next level; grows linearly
    pub fn price_at(&self, current_level: u32) -> u64 {
        self.base_price * (current_level as u64 + 1)
    }

    pub fn is_maxed(&self, current_level: u32) -> bool {
        current_level >= self.max_level
    }
}

pub fn find_skin(id: &str) -> Option<&'static Skin> {
    SKINS.iter().find(|s| s.id == id)
}

/// Shop card state for a skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinStatus {
    Locked { price: u64 },
    Owned,
    Equipped,
}

pub fn skin_status<S: Storage>(save: &SaveManager<S>, skin: &Skin) -> SkinStatus {
    if save.data().equipped_skin == skin.id {
        SkinStatus::Equipped
    } else if save.is_skin_unlocked(skin.id) {
        SkinStatus::Owned
    } else {
        SkinStatus::Locked { price: skin.price }
    }
}

/// Equip an owned skin, or buy and equip a locked one.
///
/// Returns false for unknown skins or when the balance is too low.
pub fn purchase_skin<S: Storage>(save: &mut SaveManager<S>, id: &str) -> bool {
    let Some(skin) = find_skin(id) else {
        return false;
    };
    if save.is_skin_unlocked(skin.id) {
        return save.equip_skin(skin.id);
    }
    if !save.spend_coins(skin.price) {
        return false;
    }
    save.unlock_skin(skin.id);
    save.equip_skin(skin.id)
}

/// Buy the next level of an upgrade. False when maxed or unaffordable.
pub fn purchase_upgrade<S: Storage>(save: &mut SaveManager<S>, kind: PowerUpKind) -> bool {
    let offer = UpgradeOffer::for_kind(kind);
    let level = save.data().upgrades.level(kind);
    if offer.is_maxed(level) {
        return false;
    }
    save.purchase_upgrade(kind, offer.price_at(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn save_with(coins: u64) -> SaveManager<MemoryStorage> {
        let mut save = SaveManager::open(MemoryStorage::new());
        save.add_coins(coins);
        save
    }

    #[test]
    fn test_upgrade_pricing() {
        let offer = UpgradeOffer::for_kind(PowerUpKind::Magnet);
        assert_eq!(offer.price_at(0), 200);
        assert_eq!(offer.price_at(4), 1000);
        assert!(offer.is_maxed(5));
    }

    #[test]
    fn test_purchase_upgrade_until_max() {
        let mut save = save_with(10_000);
        for _ in 0..5 {
            assert!(purchase_upgrade(&mut save, PowerUpKind::Invincibility));
        }
        // 200 + 400 + 600 + 800 + 1000
        assert_eq!(save.coins(), 7_000);
        assert!(!purchase_upgrade(&mut save, PowerUpKind::Invincibility));
        assert_eq!(save.coins(), 7_000);
        assert_eq!(save.data().upgrades.invincibility_level, 5);
    }

    #[test]
    fn test_purchase_upgrade_insufficient() {
        let mut save = save_with(150);
        assert!(!purchase_upgrade(&mut save, PowerUpKind::Magnet));
        assert_eq!(save.coins(), 150);
        assert_eq!(save.data().upgrades.magnet_level, 0);
    }

    #[test]
    fn test_skin_purchase_flow() {
        let mut save = save_with(120);
        let toxic = find_skin("toxic").unwrap();
        assert_eq!(skin_status(&save, toxic), SkinStatus::Locked { price: 100 });
        assert!(purchase_skin(&mut save, "toxic"));
        assert_eq!(save.coins(), 20);
        assert_eq!(skin_status(&save, toxic), SkinStatus::Equipped);

        assert!(!purchase_skin(&mut save, "golden"));
        assert_eq!(save.coins(), 20);

        // Re-selecting an owned skin is free
        assert!(purchase_skin(&mut save, "default"));
        assert_eq!(skin_status(&save, toxic), SkinStatus::Owned);
        assert!(purchase_skin(&mut save, "toxic"));
        assert_eq!(save.coins(), 20);

        assert!(!purchase_skin(&mut save, "rainbow"));
    }
}
