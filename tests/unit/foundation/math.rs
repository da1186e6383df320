use super::*;

#[test]
fn half_even_rounds_ties_to_even() {
    assert_eq!(div_round_half_even(1, 2), 0);
    assert_eq!(div_round_half_even(3, 2), 2);
    assert_eq!(div_round_half_even(5, 2), 2);
    assert_eq!(div_round_half_even(7, 2), 4);
}

#[test]
fn half_even_rounds_non_ties_to_nearest() {
    assert_eq!(div_round_half_even(0, 7), 0);
    assert_eq!(div_round_half_even(10, 3), 3);
    assert_eq!(div_round_half_even(11, 3), 4);
    assert_eq!(div_round_half_even(1000, 1000), 1);
}

#[test]
fn float_rounding_matches_integer_rule() {
    assert_eq!(round_half_even_f64(2.5), 2.0);
    assert_eq!(round_half_even_f64(3.5), 4.0);
    assert_eq!(round_half_even_f64(2.4999), 2.0);
}

#[test]
fn mul_div255_bounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}
