//! Pricing scenarios for the Acme fixture set.
//!
//! Catalog: R01 Red Widget $32.95, G01 Green Widget $24.95, B01 Blue Widget $7.95.
//! Delivery: under $50 costs $4.95, under $90 costs $2.95, $90 and over ships free.
//! Offer: buy one red widget, get the second half price (half rounded down to the cent).
//!
//! Delivery is charged on the subtotal after offers.

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use acme_basket::prelude::*;

fn usd(minor: i64) -> Money<'static, rusty_money::iso::Currency> {
    Money::from_minor(minor, USD)
}

#[test]
fn empty_basket_pays_base_delivery() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let basket = fixture.empty_basket()?;

    assert_eq!(basket.subtotal()?, usd(0));
    assert_eq!(basket.discounts()?, usd(0));
    assert_eq!(basket.delivery_cost()?, usd(495));
    assert_eq!(basket.total()?, usd(495));

    Ok(())
}

#[test]
fn worked_examples() -> TestResult {
    let fixture = Fixture::from_set("acme")?;

    let cases: [(&[&str], i64); 4] = [
        (&["B01", "G01"], 3785),
        (&["R01", "R01"], 5437),
        (&["R01", "G01"], 6085),
        (&["B01", "B01", "R01", "R01", "R01"], 9827),
    ];

    for (codes, expected) in cases {
        let basket = fixture.basket_with(codes.iter().copied())?;

        assert_eq!(basket.total()?, usd(expected), "basket {codes:?}");
    }

    Ok(())
}

#[test]
fn red_pair_breakdown() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let basket = fixture.basket("red-pair")?;

    assert_eq!(basket.subtotal()?, usd(6590));
    assert_eq!(basket.discounts()?, usd(1648));
    assert_eq!(basket.discounted_subtotal()?, usd(4942));
    assert_eq!(basket.delivery_cost()?, usd(495));
    assert_eq!(basket.total()?, usd(5437));

    Ok(())
}

#[test]
fn four_reds_ship_free_after_two_discounts() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let basket = fixture.basket("red-four")?;

    assert_eq!(basket.subtotal()?, usd(13180));
    assert_eq!(basket.discounts()?, usd(3296));
    assert_eq!(basket.delivery_cost()?, usd(0));
    assert_eq!(basket.total()?, usd(9884));

    let rule = basket.applied_delivery_rule()?.ok_or("no delivery rule")?;

    assert_eq!(rule.message, Some(DeliveryMessage::FreeDelivery));

    Ok(())
}

#[test]
fn offer_can_drop_basket_into_a_dearer_delivery_tier() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let basket = fixture.basket_with(["G01", "B01", "R01", "R01"])?;

    // $98.80 before the offer would ship free; $82.32 after it pays $2.95.
    assert_eq!(basket.subtotal()?, usd(9880));
    assert_eq!(basket.discounts()?, usd(1648));
    assert_eq!(basket.delivery_cost()?, usd(295));
    assert_eq!(basket.total()?, usd(8527));

    Ok(())
}

#[test]
fn delivery_discount_message_for_middle_tier() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let basket = fixture.basket_with(["R01", "R01", "G01"])?;

    let rule = basket.applied_delivery_rule()?.ok_or("no delivery rule")?;

    assert_eq!(rule.limit, TierLimit::Below(usd(9000)));
    assert_eq!(rule.cost, usd(295));
    assert_eq!(rule.message, Some(DeliveryMessage::DeliveryDiscount));

    Ok(())
}

#[test]
fn invalid_code_is_rejected_without_side_effects() -> TestResult {
    let fixture = Fixture::from_set("acme")?;
    let mut basket = fixture.basket_with(["R01"])?;
    let before = basket.total()?;

    let err = basket.add("ZZ99").err().ok_or("ZZ99 was accepted")?;

    assert_eq!(err.to_string(), "Product not valid: ZZ99");
    assert_eq!(basket.total()?, before);
    assert_eq!(basket.len(), 1);

    Ok(())
}

#[test]
fn every_named_basket_matches_its_expected_total() -> TestResult {
    let fixture = Fixture::from_set("acme")?;

    assert!(fixture.baskets().len() >= 4);

    for named in fixture.baskets() {
        let expected = fixture
            .expected_total(&named.name)?
            .ok_or("acme baskets declare totals")?;

        assert_eq!(
            fixture.basket(&named.name)?.total()?,
            expected,
            "basket {}",
            named.name
        );
    }

    Ok(())
}
