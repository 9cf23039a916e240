//! Period resolution: microseconds to a prescaler and period-register value.

use hal::{CounterWidth, Prescale};

/// Hardware settings for a requested period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub prescale: Prescale,
    /// Period register value; the counter runs through `0..=period`.
    pub period: u32,
    /// The request did not fit the counter and was clamped to the longest period.
    pub saturated: bool,
}

impl Resolution {
    /// Prescaled timer ticks in one period.
    pub const fn ticks(&self) -> u64 {
        self.period as u64 + 1
    }
}

/// Picks the smallest prescaler whose scaled cycle count fits `width`.
///
/// Never fails: a request longer than the counter can represent saturates at
/// 1:256 with the maximum period, and a zero-length request yields the
/// shortest period at 1:1.
pub fn resolve(cycles_per_us: u32, micros: u32, width: CounterWidth) -> Resolution {
    let cycles = u64::from(cycles_per_us) * u64::from(micros);
    let limit = width.limit();

    for prescale in Prescale::ASCENDING {
        let count = cycles >> prescale.shift();
        if count < limit {
            return Resolution {
                prescale,
                period: count.saturating_sub(1) as u32,
                saturated: false,
            };
        }
    }

    Resolution {
        prescale: Prescale::Div256,
        period: width.max_count(),
        saturated: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MHZ_80: u32 = 80;

    #[test]
    fn hundred_millis_at_80mhz_needs_div256() {
        // 8_000_000 cycles: 1_000_000 at 1:8, 125_000 at 1:64, 31_250 at 1:256
        let res = resolve(MHZ_80, 100_000, CounterWidth::Bits16);
        assert_eq!(res.prescale, Prescale::Div256);
        assert_eq!(res.period, 31_249);
        assert!(!res.saturated);
    }

    #[test]
    fn short_period_stays_at_div1() {
        let res = resolve(MHZ_80, 100, CounterWidth::Bits16);
        assert_eq!(res.prescale, Prescale::Div1);
        assert_eq!(res.period, 7_999);
    }

    #[test]
    fn zero_micros_is_shortest_period() {
        let res = resolve(MHZ_80, 0, CounterWidth::Bits16);
        assert_eq!(res.prescale, Prescale::Div1);
        assert_eq!(res.period, 0);
        assert!(!res.saturated);
    }

    #[test]
    fn boundary_moves_to_next_prescaler() {
        // 65_535 cycles fit at 1:1, 65_536 do not
        let fits = resolve(1, 65_535, CounterWidth::Bits16);
        assert_eq!((fits.prescale, fits.period), (Prescale::Div1, 65_534));

        let spills = resolve(1, 65_536, CounterWidth::Bits16);
        assert_eq!((spills.prescale, spills.period), (Prescale::Div8, 8_191));
    }

    #[test]
    fn over_range_saturates_16bit() {
        let res = resolve(MHZ_80, 1_000_000, CounterWidth::Bits16);
        assert_eq!(res.prescale, Prescale::Div256);
        assert_eq!(res.period, 65_535);
        assert!(res.saturated);
    }

    #[test]
    fn over_range_saturates_32bit() {
        // Even u32::MAX us at 80 MHz fits at 1:256; a 1 GHz clock does not.
        let res = resolve(1_000, u32::MAX, CounterWidth::Bits32);
        assert_eq!(res.prescale, Prescale::Div256);
        assert_eq!(res.period, u32::MAX);
        assert!(res.saturated);
    }

    #[test]
    fn composite_uses_32bit_bound() {
        // 10 s at 80 MHz: 800_000_000 cycles fit a 32-bit counter unscaled
        let res = resolve(MHZ_80, 10_000_000, CounterWidth::Bits32);
        assert_eq!(res.prescale, Prescale::Div1);
        assert_eq!(res.period, 799_999_999);

        // 60 s: 4_800_000_000 cycles need 1:8
        let res = resolve(MHZ_80, 60_000_000, CounterWidth::Bits32);
        assert_eq!(res.prescale, Prescale::Div8);
        assert_eq!(res.period, 599_999_999);
    }

    #[test]
    fn chosen_prescaler_is_smallest_that_fits() {
        for clock in [1, 8, 40, 80] {
            let bound = 65_535u64 * 256 / u64::from(clock);
            let mut micros = 0u64;
            while micros <= bound {
                let res = resolve(clock, micros as u32, CounterWidth::Bits16);
                let cycles = u64::from(clock) * micros;
                assert!(u64::from(res.period) < 65_536);
                assert!(!res.saturated);
                assert!((cycles >> res.prescale.shift()) < 65_536);
                for smaller in Prescale::ASCENDING.iter().take_while(|p| **p < res.prescale) {
                    assert!((cycles >> smaller.shift()) >= 65_536);
                }
                micros += 997;
            }
        }
    }
}
