use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use runeforge::model::{Category, Pools};
use runeforge::reducer::RankedPool;
use runeforge::scorer::{ScoreBreakdown, SynergySource};
use runeforge::search::SearchReport;

const SLOT_NAMES: [&str; 10] = [
    "Weapon", "Armor 1", "Armor 2", "Armor 3", "Armor 4", "Armor 5", "Emblem", "Acc 1", "Acc 2",
    "Acc 3",
];

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn source_label(source: &SynergySource) -> String {
    match source {
        SynergySource::DotPairing(dot) => format!("DoT pairing ({})", dot),
        SynergySource::MissingPrerequisite => "Missing DoT prerequisite".into(),
        SynergySource::DemeritForgiveness => "Demerit forgiveness".into(),
        SynergySource::CooldownCascade => "Awakening cooldown cascade".into(),
        SynergySource::CritPair => "Crit chance x damage".into(),
        SynergySource::ExtraHitPair => "Extra-hit chance x damage".into(),
        SynergySource::AttackDamagePair => "Attack x damage increase".into(),
        SynergySource::Debuff => "Target debuff".into(),
    }
}

pub fn print_search_report(report: &SearchReport, pools: &Pools, breakdown: Option<&ScoreBreakdown>) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Item"),
        Cell::new("Base").fg(Color::Cyan),
    ]);
    right_align(&mut table, 2..=2);

    if let (Some(combination), Some(b)) = (report.combination, breakdown) {
        let items = combination.items(pools);
        for ((slot, item), (_, base)) in SLOT_NAMES.iter().zip(items.iter()).zip(&b.items) {
            table.add_row(vec![
                Cell::new(slot).add_attribute(Attribute::Bold),
                Cell::new(format!("{} ({})", item.name, item.id)),
                Cell::new(format!("{:.2}", base)).fg(Color::Cyan),
            ]);
        }
        table.add_row(vec![
            Cell::new("Synergy").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(format!("{:.2}", b.synergy.score)).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(format!("{:.2}", b.total)).add_attribute(Attribute::Bold),
        ]);
    } else {
        table.add_row(vec![Cell::new("-"), Cell::new("no combination found"), Cell::new("")]);
    }
    println!("\n{}", table);

    if let Some(b) = breakdown {
        if !b.synergy.contributions.is_empty() {
            let mut table = new_table();
            table.add_row(vec![
                Cell::new("Synergy term").add_attribute(Attribute::Bold),
                Cell::new("Slot"),
                Cell::new("Value"),
            ]);
            right_align(&mut table, 2..=2);
            for c in &b.synergy.contributions {
                let colour = if c.value < 0.0 { Color::Red } else { Color::Green };
                table.add_row(vec![
                    Cell::new(source_label(&c.source)),
                    Cell::new(c.slot.map(|s| SLOT_NAMES[s]).unwrap_or("-")),
                    Cell::new(format!("{:+.2}", c.value)).fg(colour),
                ]);
            }
            println!("{}", table);
        }
        if let Some(uptime) = b.awakening_uptime {
            println!("Awakening uptime: {:.1}%", uptime * 100.0);
        }
    }

    let done = report.processed.saturating_add(report.skipped);
    let pruned = if done > 0 {
        report.skipped as f64 / done as f64 * 100.0
    } else {
        0.0
    };
    println!(
        "Evaluated {} | Pruned {} ({:.1}%) | Space {}",
        report.processed, report.skipped, pruned, report.total
    );
}

pub fn print_ranking(category: Category, items: &[runeforge::model::Item], ranked: &RankedPool, limit: usize) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new(format!("{} ranking", category)).add_attribute(Attribute::Bold),
        Cell::new("Item"),
        Cell::new("Base").fg(Color::Cyan),
        Cell::new("Max"),
        Cell::new("Top-N"),
    ]);
    right_align(&mut table, 2..=3);

    for (rank, r) in ranked.all_sorted.iter().take(limit).enumerate() {
        let item = &items[r.index];
        let in_top = ranked.top_n.contains(&r.index);
        let name_cell = if in_top {
            Cell::new(format!("{} ({})", item.name, item.id)).fg(Color::Green)
        } else {
            Cell::new(format!("{} ({})", item.name, item.id))
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            name_cell,
            Cell::new(format!("{:.2}", r.base)).fg(Color::Cyan),
            Cell::new(format!("{:.2}", r.max)),
            Cell::new(if in_top { "yes" } else { "" }),
        ]);
    }
    println!("\n{}", table);
}
