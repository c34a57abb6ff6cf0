//! Built-in chess-army item table with material costs and unlock chains.

use super::{ItemDef, ItemGate, ItemTable};

pub const PAWN: &str = "Progressive Pawn";
pub const MINOR: &str = "Progressive Minor Piece";
pub const MAJOR: &str = "Progressive Major Piece";
pub const QUEEN: &str = "Progressive Major To Queen";
pub const POCKET: &str = "Progressive Pocket";
pub const CONSUL: &str = "Progressive Consul";
pub const KING_PROMOTION: &str = "Progressive King Promotion";
pub const ENGINE_PENALTY: &str = "Progressive Engine ELO Lobotomy";
pub const VICTORY: &str = "Victory";

pub fn item_table() -> ItemTable {
    // Weights: pawns and pockets are listed twice, then every entry but the
    // queen promotion is doubled again.
    ItemTable::new(vec![
        ItemDef::progression(PAWN).quantity(40).material(100).weight(4),
        ItemDef::progression(MINOR).quantity(16).material(300).weight(2),
        ItemDef::progression(MAJOR).quantity(12).material(500).weight(2),
        ItemDef::progression(QUEEN)
            .quantity(8)
            .material(400)
            .parents(&[MAJOR]),
        ItemDef::progression(POCKET)
            .quantity(12)
            .material(110)
            .gate(ItemGate::Pocket)
            .weight(4),
        ItemDef::progression(CONSUL).quantity(3).material(350).weight(2),
        ItemDef::progression(KING_PROMOTION)
            .quantity(2)
            .material(250)
            .parents(&[CONSUL])
            .weight(2),
        ItemDef::progression(VICTORY).weight(0),
        ItemDef::useful(ENGINE_PENALTY).quantity(5),
        ItemDef::useful("Progressive Pocket Gems")
            .quantity(12)
            .parents(&[POCKET])
            .gate(ItemGate::Pocket),
        ItemDef::useful("Progressive Pocket Range")
            .quantity(12)
            .parents(&[POCKET])
            .gate(ItemGate::Pocket),
        ItemDef::useful("Play as White"),
        ItemDef::filler("Progressive Pawn Forwardness"),
        ItemDef::filler("Pocket Gems").gate(ItemGate::Pocket),
    ])
    .with_starter_tiers(&[PAWN, MINOR, MAJOR])
    .with_goal(VICTORY)
}
