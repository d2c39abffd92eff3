use ansi_term::{Colour, Style};

use crate::display::projector::{DayGroup, OpacityTier, Projection, MAX_ROTATION_DEGREES};

/// Terminal stand-in for opacity: the older an entry, the darker its shade of grey.
fn tier_style(tier: OpacityTier) -> Style {
    match tier {
        OpacityTier::Fresh => Colour::Green.bold(),
        // Greys run from 232 (darkest) to 255 (brightest).
        OpacityTier::Faded(days) => Colour::Fixed(255 - 3 * days).normal(),
        OpacityTier::Expired => Colour::Fixed(232).dimmed(),
    }
}

/// Rotation can't be drawn in a terminal, it shifts the entry sideways instead.
fn jitter(rotation: i8) -> String {
    " ".repeat((rotation + MAX_ROTATION_DEGREES).max(0) as usize)
}

fn print_group(group: &DayGroup, plain: bool) {
    if plain {
        println!("{} ({})", group.heading, group.day);
    } else {
        println!(
            "{} {}",
            Style::new().bold().underline().paint(&group.heading),
            Colour::Fixed(244).paint(format!("({})", group.day))
        );
    }

    for item in &group.items {
        if plain {
            println!("  {}", item.text);
        } else {
            println!(
                "  {}{}",
                jitter(item.rotation),
                tier_style(item.tier).paint(&item.text)
            );
        }
    }
    println!();
}

pub fn print_projection(projection: &Projection, plain: bool) {
    match projection {
        Projection::Placeholder(text) => println!("{text}"),
        Projection::Groups(groups) => {
            for group in groups {
                print_group(group, plain);
            }
        }
    }
}
