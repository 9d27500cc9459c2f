use crate::affordability::{MaxLoanQuote, MaxLoanRequest};
use crate::api::infra::build_service;
use crate::config::AppConfig;
use crate::engine::{
    ApplicantFinancials, LevyAssessment, Money, NoApplicableRulePolicy, PropertyType, Rate,
};
use crate::error::AppError;
use crate::regulatory::{load_config_from_path, ProviderError};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct MaxLoanArgs {
    /// Gross monthly income of the primary applicant
    #[arg(long)]
    pub(crate) income: Money,
    /// Existing monthly debt obligations of the primary applicant
    #[arg(long, default_value_t = 0.0)]
    pub(crate) debt: Money,
    /// Property category being financed
    #[arg(long, value_enum)]
    pub(crate) property_type: PropertyType,
    /// Quoted annual interest rate in percent (raised to the stress-test floor if lower)
    #[arg(long)]
    pub(crate) rate: Rate,
    /// Loan tenure in whole years
    #[arg(long)]
    pub(crate) tenure: u32,
    /// Purchase price, to report financing, down payment, and stamp duty
    #[arg(long)]
    pub(crate) price: Option<Money>,
    /// Gross monthly income of a co-applicant for a joint application
    #[arg(long)]
    pub(crate) co_applicant_income: Option<Money>,
    /// Existing monthly debt obligations of the co-applicant
    #[arg(long, default_value_t = 0.0)]
    pub(crate) co_applicant_debt: Money,
}

#[derive(Args, Debug)]
pub(crate) struct LevyArgs {
    /// Name of the schedule, e.g. buyer_stamp_duty
    #[arg(long)]
    pub(crate) schedule: String,
    /// Base value to assess
    #[arg(long)]
    pub(crate) value: Money,
}

#[derive(Args, Debug)]
pub(crate) struct CheckConfigArgs {
    /// JSON regulatory document to validate
    #[arg(long)]
    pub(crate) path: PathBuf,
}

pub(crate) fn run_max_loan(args: MaxLoanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config.regulatory)?;
    let quote = service.max_loan(&max_loan_request(&args))?;
    render_max_loan(&quote);
    Ok(())
}

pub(crate) fn run_levy(args: LevyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config.regulatory)?;
    let assessment = service.levy(&args.schedule, args.value)?;
    render_levy(&args.schedule, &assessment);
    Ok(())
}

pub(crate) fn run_check_config(args: CheckConfigArgs) -> Result<(), AppError> {
    let regulations = load_config_from_path(&args.path).map_err(ProviderError::from)?;

    println!("Regulatory configuration OK: {}", args.path.display());
    println!("Effective from: {}", regulations.effective_from());
    println!("Schedules:");
    for name in regulations.schedule_names() {
        let bands = regulations
            .schedule(name)
            .map(|schedule| schedule.bands().len())
            .unwrap_or_default();
        println!("  - {name} ({bands} bands)");
    }
    println!("Ratio rules:");
    for rule in regulations.ratio_rules().rules() {
        let applies_to = if rule.applicable_property_types.is_empty() {
            "all property types".to_string()
        } else {
            rule.applicable_property_types
                .iter()
                .map(|property_type| property_type.label())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "  - {} [{}] ceiling {:.0}% ({})",
            rule.name,
            rule.kind.label(),
            rule.ceiling * 100.0,
            applies_to
        );
    }
    println!("Coverage:");
    for property_type in PropertyType::ordered() {
        let rules = regulations
            .ratio_rules()
            .applicable(property_type)
            .map(|rule| rule.name.as_str())
            .collect::<Vec<_>>();
        let coverage = if rules.is_empty() {
            match regulations.ratio_rules().fallback() {
                NoApplicableRulePolicy::Reject => "no rule applies (rejected)".to_string(),
                NoApplicableRulePolicy::DefaultCeiling { ceiling } => {
                    format!("default ceiling {:.0}%", ceiling * 100.0)
                }
            }
        } else {
            rules.join(", ")
        };
        println!("  - {}: {coverage}", property_type.label());
    }

    Ok(())
}

fn max_loan_request(args: &MaxLoanArgs) -> MaxLoanRequest {
    let primary = ApplicantFinancials::single(args.income, args.debt);
    let financials = match args.co_applicant_income {
        Some(income) => ApplicantFinancials::combine(
            &primary,
            &ApplicantFinancials::single(income, args.co_applicant_debt),
        ),
        None => primary,
    };

    MaxLoanRequest {
        financials,
        property_type: args.property_type,
        quoted_annual_rate_pct: args.rate,
        tenure_years: args.tenure,
        property_price: args.price,
    }
}

fn render_max_loan(quote: &MaxLoanQuote) {
    println!("Maximum Loan Assessment");
    println!("=======================");
    println!("Property type: {}", quote.property_type.label());
    println!(
        "Stress-tested rate: {:.2}% over {} years",
        quote.stress_test_annual_rate_pct, quote.tenure_years
    );
    println!(
        "Binding rule: {}",
        quote
            .binding_rule
            .as_ref()
            .map(|rule| rule.as_str())
            .unwrap_or("default ceiling")
    );
    println!("Max monthly payment: {:.2}", quote.max_monthly_payment);
    println!("Max loan: {:.2}", quote.max_loan);

    if let Some(purchase) = &quote.purchase {
        println!();
        println!("Purchase price: {:.2}", purchase.property_price);
        println!("Loan-to-value cap: {:.2}", purchase.loan_to_value_cap);
        println!("Financed amount: {:.2}", purchase.financed_amount);
        println!("Down payment: {:.2}", purchase.down_payment);
        if let Some(duty) = &purchase.stamp_duty {
            println!("Stamp duty: {:.2}", duty.total);
        }
    }

    println!(
        "\nRegulations effective from {}",
        quote.regulations_effective_from
    );
}

fn render_levy(schedule: &str, assessment: &LevyAssessment) {
    println!("Levy: {schedule}");
    println!("Base value: {:.2}", assessment.base_value);
    for charge in &assessment.breakdown {
        println!(
            "  - {:<32} {:>6.2}% on {:>14.2} = {:>12.2}",
            charge.label,
            charge.rate * 100.0,
            charge.portion,
            charge.amount
        );
    }
    println!(
        "Total: {:.2} (effective {:.2}%)",
        assessment.total,
        assessment.effective_rate() * 100.0
    );
}
