#![cfg(not(target_arch = "wasm32"))]

use glyph_vm::{Machine, MachineConfig, NoHooks};
use proptest::prelude::*;

fn run_bytes(image: &[u8]) -> Machine {
    let mut m = Machine::new(
        MachineConfig::default().with_max_steps(10_000),
        image,
        NoHooks,
    )
    .unwrap();
    assert!(m.run().is_halted(), "image did not halt: {image:?}");
    m
}

/// `:agX :bgY <op>ab=c` with `X` and `Y` as raw bytes.
fn binary_program(op: u8, x: u8, y: u8) -> Vec<u8> {
    vec![b':', b'a', b'g', x, b':', b'b', b'g', y, op, b'a', b'b', b'=', b'c']
}

fn reference(op: u8, x: u8, y: u8) -> u8 {
    match op {
        b'+' => x.wrapping_add(y),
        b'-' => x.wrapping_sub(y),
        b'*' => x.wrapping_mul(y),
        b'/' => x.checked_div(y).unwrap_or(0),
        b'%' => x.checked_rem(y).unwrap_or(0),
        b'&' => x & y,
        b'|' => x | y,
        b'^' => x ^ y,
        _ => unreachable!(),
    }
}

/// Builds `N` nested subroutines, each calling the next, and a main that calls the first
/// and then records the program counter in `p`.
///
/// Layout: a prologue of `DDD=R ` assignments (one per subroutine address), then
/// `;A:p..$`, then the subroutines `;B,` `;C,` ... with a bare `,` last.
fn nested_calls(n: usize) -> (Vec<u8>, u8) {
    let prologue_len = 6 * n;
    let main_len = 7;
    let name = |i: usize| b'A' + i as u8;
    let addr = |i: usize| prologue_len + main_len + 3 * i;

    let mut src = Vec::new();
    for i in 0..n {
        src.extend_from_slice(format!("{:03}={} ", addr(i), char::from(name(i))).as_bytes());
    }
    src.extend_from_slice(b";A:p..$");
    for i in 0..n - 1 {
        src.extend_from_slice(&[b';', name(i + 1), b',']);
    }
    src.push(b',');

    // `:p..` sits right after the two-byte call and captures the address past itself.
    let expected_p = (prologue_len + 2 + 4) as u8;
    (src, expected_p)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn binary_ops_match_wrapping_reference(
        op in prop::sample::select(b"+-*/%&|^".to_vec()),
        x in any::<u8>(),
        y in any::<u8>(),
    ) {
        let m = run_bytes(&binary_program(op, x, y));
        prop_assert_eq!(m.register(b'c'), reference(op, x, y));
        prop_assert_eq!(m.accumulator(), 0);
    }

    #[test]
    fn not_is_complement(x in any::<u8>()) {
        let m = run_bytes(&[b':', b'a', b'g', x, b'~', b'a', b'=', b'c']);
        prop_assert_eq!(m.register(b'c'), 255 - x);
    }

    #[test]
    fn shifts_saturate_at_eight(x in any::<u8>(), amount in any::<u8>()) {
        let left = run_bytes(&[b':', b'a', b'g', x, b'\'', amount, b'<', b'a', b'=', b'c']);
        let right = run_bytes(&[b':', b'a', b'g', x, b'\'', amount, b'>', b'a', b'=', b'c']);
        let (want_l, want_r) = if amount >= 8 {
            (0, 0)
        } else {
            (x << amount, x >> amount)
        };
        prop_assert_eq!(left.register(b'c'), want_l);
        prop_assert_eq!(right.register(b'c'), want_r);
    }

    #[test]
    fn decimal_literal_assigns_its_value(v in any::<u8>()) {
        let m = run_bytes(format!("{v}=a").as_bytes());
        prop_assert_eq!(m.register(b'a'), v);
    }

    #[test]
    fn memory_store_then_load_round_trips(addr in 64u8.., v in any::<u8>()) {
        // Addresses below 64 would overwrite the program itself.
        let mut image = vec![b':', b'v', b'g', v, b':', b'd', b'g', addr];
        image.extend_from_slice(b"d=!v d=@w");
        let m = run_bytes(&image);
        prop_assert_eq!(m.register(b'w'), v);
        prop_assert_eq!(m.memory()[usize::from(addr)], v);
    }

    #[test]
    fn nested_calls_unwind_in_order(n in 1usize..=20) {
        let (src, expected_p) = nested_calls(n);
        let m = run_bytes(&src);
        prop_assert_eq!(m.register(b'p'), expected_p);
        prop_assert!(m.stack().is_empty());
    }
}
