//! Rule-based pricing engine
//!
//! Deterministic: the same specification and rate card always produce the
//! same breakdown and total. Every monetary value is rounded to cents as
//! soon as it is produced, so totals do not depend on evaluation order.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

use crate::domain::{
    PriceEstimate, PricingBreakdown, PrintMethod, PrintSpecification, ProductType, Sides,
};
use crate::services::rate_card::RateCard;

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

/// Offset at or above the product's threshold, digital below it.
pub fn determine_print_method(
    product_type: ProductType,
    quantity: u32,
    card: &RateCard,
) -> (PrintMethod, String) {
    let threshold = card.offset_threshold(product_type);

    if quantity >= threshold {
        (
            PrintMethod::Offset,
            format!(
                "Offset printing selected: quantity ({quantity}) is at or above the offset \
                 threshold of {threshold} for {product_type}. Lower per-unit cost at scale; \
                 requires plate setup."
            ),
        )
    } else {
        (
            PrintMethod::Digital,
            format!(
                "Digital printing selected: quantity ({quantity}) is below the offset \
                 threshold of {threshold} for {product_type}. No plate setup required."
            ),
        )
    }
}

/// Price a specification against `card`.
///
/// Unknown products use the card's default row and unpriced options are
/// skipped; both are reported in `estimate_notes` rather than failing.
pub fn calculate_price(spec: &PrintSpecification, card: &RateCard) -> PriceEstimate {
    let mut notes = Vec::new();
    let quantity = Decimal::from(spec.quantity);

    let rates = match card.product_rates(spec.product_type) {
        Some(rates) => rates,
        None => {
            tracing::warn!(
                product_type = %spec.product_type,
                rate_card = %card.version,
                "No rates for product, using default pricing row"
            );
            notes.push(format!(
                "No rate card entry for {}; standard default rates applied",
                spec.product_type
            ));
            &card.default_product
        }
    };

    // 1. Print method
    let (print_method, print_method_reason) =
        determine_print_method(spec.product_type, spec.quantity, card);

    // 2-5. Base costs
    let material_cost = round_money(rates.material_per_unit * quantity);

    let mut print_total = rates.print_per_unit.for_method(print_method) * quantity;
    if spec.sides == Sides::Double {
        print_total *= card.double_sided_multiplier;
        notes.push(format!(
            "Double-sided printing ({}x print cost)",
            card.double_sided_multiplier.normalize()
        ));
    }
    let print_cost = round_money(print_total);

    let setup_cost = round_money(card.setup_costs.for_method(print_method));

    let finishing_cost = round_money(if spec.quantity >= card.finishing.threshold_quantity {
        card.finishing.large_order_fee
    } else {
        card.finishing.standard_fee
    });

    // 6. Options
    let mut option_costs = BTreeMap::new();
    for option in &spec.options {
        match card.option_rate(*option) {
            Some(rate) => {
                option_costs.insert(*option, round_money(rate.flat_fee + rate.per_unit_fee * quantity));
            }
            None => {
                tracing::warn!(option = %option, rate_card = %card.version, "Option not priced");
                notes.push(format!(
                    "Option '{option}' is not in the pricing catalog and was not priced"
                ));
            }
        }
    }
    let options_total: Decimal = option_costs.values().sum();

    let base_cost = material_cost + print_cost + setup_cost + finishing_cost + options_total;

    // 7. Rush fee, on pre-discount, pre-margin cost
    let rush_fee = if spec.is_rush {
        notes.push(format!(
            "Rush fee of {}% applied",
            percent(card.rush_fee_rate)
        ));
        round_money(card.rush_fee_rate * base_cost)
    } else {
        Decimal::ZERO
    };

    // 8. Quantity discount, on material and print only
    let discount_rate = card.discount_rate(spec.quantity);
    let quantity_discount = if discount_rate.is_zero() {
        Decimal::ZERO
    } else {
        notes.push(format!(
            "{}% volume discount applied to material and print",
            percent(discount_rate)
        ));
        -round_money(discount_rate * (material_cost + print_cost))
    };

    // 9-11. Margin
    let cost_subtotal = round_money(base_cost + rush_fee + quantity_discount);
    let margin_amount = round_money(
        cost_subtotal * Decimal::from(card.margin_percent) / Decimal::ONE_HUNDRED,
    );
    let subtotal = round_money(cost_subtotal + margin_amount);

    // 12-13. Tax and floor
    let tax = round_money(card.tax_rate * subtotal);
    let computed_total = round_money(subtotal + tax);
    let total = if computed_total < card.minimum_order_value {
        let floor = round_money(card.minimum_order_value);
        notes.push(format!("Minimum order value of ${floor:.2} applied"));
        floor
    } else {
        computed_total
    };

    tracing::info!(
        product_type = %spec.product_type,
        quantity = spec.quantity,
        print_method = %print_method,
        total = %total,
        rate_card = %card.version,
        "Calculated price estimate"
    );

    PriceEstimate {
        print_method,
        print_method_reason,
        breakdown: PricingBreakdown {
            material_cost,
            print_cost,
            setup_cost,
            finishing_cost,
            option_costs,
            rush_fee,
            quantity_discount,
            margin_amount,
            margin_percent: card.margin_percent,
        },
        subtotal,
        tax,
        total,
        currency: card.currency.clone(),
        estimate_notes: notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorMode, Finish, PrintOption};

    fn card() -> RateCard {
        RateCard::builtin().unwrap()
    }

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn spec(product_type: ProductType, quantity: u32) -> PrintSpecification {
        PrintSpecification {
            product_type,
            quantity,
            size: product_type.default_size().to_string(),
            paper_stock: "14pt cardstock".to_string(),
            sides: Sides::Single,
            color_mode: ColorMode::FullColor,
            finish: Finish::Matte,
            options: vec![],
            turnaround_days: None,
            is_rush: false,
            artwork_dpi: None,
            raw_input: String::new(),
            defaulted_fields: vec![],
        }
    }

    fn scenario_a() -> PrintSpecification {
        PrintSpecification {
            sides: Sides::Double,
            options: vec![PrintOption::RoundedCorners],
            turnaround_days: Some(2),
            is_rush: true,
            ..spec(ProductType::BusinessCards, 500)
        }
    }

    fn assert_cents(value: Decimal) {
        assert_eq!(value, value.round_dp(2), "{value} has sub-cent residue");
    }

    #[test]
    fn rush_business_cards_breakdown() {
        let estimate = calculate_price(&scenario_a(), &card());
        let b = &estimate.breakdown;

        assert_eq!(estimate.print_method, PrintMethod::Offset);
        assert_eq!(b.material_cost, money(1000));
        assert_eq!(b.print_cost, money(2250));
        assert_eq!(b.setup_cost, money(6000));
        assert_eq!(b.finishing_cost, money(500));
        assert_eq!(b.option_costs[&PrintOption::RoundedCorners], money(1000));
        assert_eq!(b.rush_fee, money(3225));
        assert_eq!(b.quantity_discount, money(-325));
        assert_eq!(b.margin_amount, money(4095));
        assert_eq!(b.margin_percent, 30);
        assert_eq!(estimate.subtotal, money(17745));
        assert_eq!(estimate.tax, Decimal::ZERO);
        assert_eq!(estimate.total, money(17745));
        assert_eq!(estimate.currency, "USD");
        assert!(estimate.estimate_notes.iter().any(|n| n.contains("10% volume discount")));
        assert!(estimate.estimate_notes.iter().any(|n| n.contains("Rush fee of 30%")));
    }

    #[test]
    fn pricing_is_deterministic() {
        let card = card();
        let spec = scenario_a();
        let first = calculate_price(&spec, &card);
        let second = calculate_price(&spec, &card);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn offset_threshold_boundaries() {
        let card = card();
        let method = |product, quantity| determine_print_method(product, quantity, &card).0;

        assert_eq!(method(ProductType::BusinessCards, 499), PrintMethod::Digital);
        assert_eq!(method(ProductType::BusinessCards, 500), PrintMethod::Offset);
        assert_eq!(method(ProductType::Posters, 249), PrintMethod::Digital);
        assert_eq!(method(ProductType::Posters, 250), PrintMethod::Offset);
    }

    #[test]
    fn reason_cites_quantity_and_threshold() {
        let (_, reason) = determine_print_method(ProductType::Posters, 249, &card());
        assert!(reason.contains("(249)"));
        assert!(reason.contains("250"));
        assert!(reason.contains("posters"));
    }

    #[test]
    fn offset_setup_costs_more_than_digital() {
        let card = card();
        let digital = calculate_price(&spec(ProductType::Flyers, 499), &card);
        let offset = calculate_price(&spec(ProductType::Flyers, 500), &card);
        assert!(offset.breakdown.setup_cost > digital.breakdown.setup_cost);
    }

    #[test]
    fn digital_order_just_below_threshold() {
        let estimate = calculate_price(&spec(ProductType::BusinessCards, 499), &card());

        assert_eq!(estimate.print_method, PrintMethod::Digital);
        assert_eq!(estimate.breakdown.material_cost, money(998));
        assert_eq!(estimate.breakdown.print_cost, money(2495));
        assert_eq!(estimate.breakdown.setup_cost, money(500));
        assert_eq!(estimate.breakdown.quantity_discount, money(-175));
        assert_eq!(estimate.breakdown.margin_amount, money(1295));
        assert_eq!(estimate.total, money(5613));
    }

    #[test]
    fn no_rush_means_no_rush_fee() {
        let estimate = calculate_price(&spec(ProductType::Flyers, 300), &card());

        assert_eq!(estimate.breakdown.rush_fee, Decimal::ZERO);
        assert!(!estimate.estimate_notes.iter().any(|n| n.contains("Rush")));
    }

    #[test]
    fn small_orders_have_no_discount() {
        let estimate = calculate_price(&spec(ProductType::BusinessCards, 100), &card());
        assert_eq!(estimate.breakdown.quantity_discount, Decimal::ZERO);
        assert!(!estimate.breakdown.quantity_discount.is_sign_negative());
    }

    #[test]
    fn single_poster_hits_the_minimum_floor() {
        for sides in [Sides::Single, Sides::Double] {
            let poster = PrintSpecification {
                sides,
                ..spec(ProductType::Posters, 1)
            };
            let estimate = calculate_price(&poster, &card());

            assert!(estimate.subtotal + estimate.tax < money(1500));
            assert_eq!(estimate.total, money(1500));
            assert!(estimate
                .estimate_notes
                .iter()
                .any(|n| n == "Minimum order value of $15.00 applied"));
        }
    }

    #[test]
    fn large_orders_pay_the_higher_finishing_fee() {
        let card = card();
        let small = calculate_price(&spec(ProductType::Flyers, 999), &card);
        let large = calculate_price(&spec(ProductType::Flyers, 1000), &card);

        assert_eq!(small.breakdown.finishing_cost, money(500));
        assert_eq!(large.breakdown.finishing_cost, money(2000));
    }

    #[test]
    fn per_unit_options_scale_with_quantity() {
        let card = card();
        let with_foil = |quantity| PrintSpecification {
            options: vec![PrintOption::FoilStamping],
            ..spec(ProductType::BusinessCards, quantity)
        };

        let small = calculate_price(&with_foil(100), &card);
        let large = calculate_price(&with_foil(1000), &card);

        assert_eq!(small.breakdown.option_costs[&PrintOption::FoilStamping], money(800));
        assert_eq!(large.breakdown.option_costs[&PrintOption::FoilStamping], money(8000));
    }

    #[test]
    fn every_amount_is_whole_cents() {
        let card = card();
        let odd = PrintSpecification {
            sides: Sides::Double,
            options: vec![
                PrintOption::FoilStamping,
                PrintOption::Embossing,
                PrintOption::Lamination,
                PrintOption::Perforation,
            ],
            is_rush: true,
            ..spec(ProductType::Letterheads, 333)
        };

        for candidate in [odd, scenario_a(), spec(ProductType::Catalogs, 7777)] {
            let estimate = calculate_price(&candidate, &card);
            let b = &estimate.breakdown;
            for value in [
                b.material_cost,
                b.print_cost,
                b.setup_cost,
                b.finishing_cost,
                b.rush_fee,
                b.quantity_discount,
                b.margin_amount,
                estimate.subtotal,
                estimate.tax,
                estimate.total,
            ] {
                assert_cents(value);
            }
            b.option_costs.values().copied().for_each(assert_cents);
        }
    }

    #[test]
    fn tax_is_applied_to_the_subtotal() {
        let mut card = card();
        card.tax_rate = Decimal::new(825, 4);

        let estimate = calculate_price(&scenario_a(), &card);

        assert_eq!(estimate.subtotal, money(17745));
        assert_eq!(estimate.tax, money(1464));
        assert_eq!(estimate.total, money(19209));
    }

    #[test]
    fn unpriced_option_is_noted_not_charged() {
        let mut card = card();
        card.options.remove(&PrintOption::SpotUv);

        let plain = calculate_price(&spec(ProductType::Flyers, 300), &card);
        let with_spot_uv = calculate_price(
            &PrintSpecification {
                options: vec![PrintOption::SpotUv],
                ..spec(ProductType::Flyers, 300)
            },
            &card,
        );

        assert!(with_spot_uv.breakdown.option_costs.is_empty());
        assert_eq!(with_spot_uv.total, plain.total);
        assert!(with_spot_uv
            .estimate_notes
            .iter()
            .any(|n| n.contains("'spot_uv' is not in the pricing catalog")));
    }

    #[test]
    fn unknown_product_uses_default_row() {
        let mut card = card();
        card.products.remove(&ProductType::Banners);

        let estimate = calculate_price(&spec(ProductType::Banners, 10), &card);

        assert_eq!(estimate.breakdown.material_cost, money(50));
        assert!(estimate.total >= card.minimum_order_value);
        assert!(estimate.estimate_notes[0].contains("No rate card entry for banners"));
    }
}
