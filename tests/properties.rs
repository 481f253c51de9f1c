//! Property-based tests using proptest

use aym::aym::device::{channel_level, LEVEL_MASK};
use aym::aym::{mix_turbo, ClockSource, PsgBackend, Renderer, TurboSound, VolumeTable};
use aym::config::{ChipType, Interpolation, LayoutType};
use aym::{MatrixMixer, Psg, Register, Registers, Sample, Stamp};
use proptest::prelude::*;

fn table() -> VolumeTable {
    let mut table = VolumeTable::new();
    table.set_parameters(ChipType::Ym, LayoutType::Abc, &MatrixMixer::default());
    table
}

fn register() -> impl Strategy<Value = Register> {
    (0u8..15).prop_map(|addr| Register::from_addr(addr).unwrap_or(Register::Beeper))
}

fn writes() -> impl Strategy<Value = Registers> {
    prop::collection::vec((register(), any::<u8>()), 0..20).prop_map(|writes| {
        let mut regs = Registers::new();
        for (reg, value) in writes {
            regs.set(reg, value);
        }
        regs
    })
}

proptest! {
    // ==================== TurboSound ====================

    #[test]
    fn prop_turbo_mix_is_halved_saturating_sum(
        l1 in any::<i16>(), r1 in any::<i16>(), l2 in any::<i16>(), r2 in any::<i16>()
    ) {
        let mixed = mix_turbo(Sample::new(l1, r1), Sample::new(l2, r2));
        prop_assert_eq!(mixed.left, l1.saturating_add(l2) >> 1);
        prop_assert_eq!(mixed.right, r1.saturating_add(r2) >> 1);
        prop_assert!(mixed.left >= i16::MIN / 2 && mixed.left <= i16::MAX / 2);
        prop_assert!(mixed.right >= i16::MIN / 2 && mixed.right <= i16::MAX / 2);
    }

    #[test]
    fn prop_turbo_sound_output_combines_chips(
        first in writes(), second in writes(), ticks in 0u32..5000
    ) {
        let table = table();
        let mut ts = TurboSound::new();
        ts.set_new_data(&[first, second]);
        ts.tick(ticks);
        let a = ts.chip(0).map(|chip| chip.get_levels(&table)).unwrap_or_default();
        let b = ts.chip(1).map(|chip| chip.get_levels(&table)).unwrap_or_default();
        prop_assert_eq!(ts.get_levels(&table), mix_turbo(a, b));
    }

    // ==================== Register masking ====================

    #[test]
    fn prop_register_values_are_masked(reg in register(), value in any::<u8>()) {
        let mut psg = Psg::new();
        let mut regs = Registers::new();
        regs.set(reg, value);
        psg.set_new_data(&regs);
        prop_assert_eq!(psg.register(reg), value & reg.width_mask());
    }

    #[test]
    fn prop_levels_stay_in_range(regs in writes(), ticks in 0u32..100_000) {
        let mut psg = Psg::new();
        psg.set_new_data(&regs);
        psg.tick(ticks);
        let levels = psg.levels();
        for channel in 0..3 {
            prop_assert!(channel_level(levels, channel) <= LEVEL_MASK);
        }
        prop_assert!(levels < 1 << 15);
    }

    #[test]
    fn prop_unwritten_registers_keep_value(value in any::<u8>(), other in writes()) {
        let mut psg = Psg::new();
        let mut regs = Registers::new();
        regs.set(Register::ToneBLo, value);
        psg.set_new_data(&regs);
        let mut later = other;
        if later.has(Register::ToneBLo) {
            return Ok(());
        }
        later.set(Register::VolumeA, 3);
        psg.set_new_data(&later);
        prop_assert_eq!(psg.register(Register::ToneBLo), value);
    }

    // ==================== Clock bridge ====================

    #[test]
    fn prop_split_render_matches_whole(
        cuts in prop::collection::vec(0u64..20_000_000, 0..8), period in 1u8..=255
    ) {
        let table = table();
        let mut regs = Registers::new();
        regs.set(Register::ToneALo, period);
        regs.set(Register::Mixer, 0x3E);
        regs.set(Register::VolumeA, 0x0F);

        let render = |stops: &[u64]| {
            let mut psg = Psg::new();
            psg.set_new_data(&regs);
            let mut clock = ClockSource::new(1_773_400, 44_100);
            let mut renderer = Renderer::new(Interpolation::Low, clock.psg_freq(), 44_100);
            let mut out = Vec::new();
            for stop in stops {
                renderer.render(&mut psg, &mut clock, &table, Stamp::from_nanos(*stop), &mut out);
            }
            out
        };

        let mut stops = cuts;
        stops.sort_unstable();
        stops.push(20_000_000);
        prop_assert_eq!(render(&stops), render(&[20_000_000]));
    }
}
