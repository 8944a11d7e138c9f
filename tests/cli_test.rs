use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_loyalty_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("loyalship"));
    cmd.arg("loyalty")
        .arg("tests/fixtures/transactions.csv")
        .arg("--name")
        .arg("Budi");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("date,amount,status"))
        .stdout(predicate::str::contains("2024-01-01,600000,success"))
        // Sunday with a zero amount is forced to failed
        .stdout(predicate::str::contains("2024-01-07,0,failed"))
        // Manual failure stays failed
        .stdout(predicate::str::contains("2024-01-06,900000,failed"))
        // Small weekend purchase keeps its weekend points
        .stdout(predicate::str::contains("2024-01-13,250000,success"))
        .stdout(predicate::str::contains("2024-01-02,100000,failed"))
        .stdout(predicate::str::contains(
            "name,total_points,max_discount,discount_percent,high_value_count,failed_count",
        ))
        .stdout(predicate::str::contains("Budi,13,REGULAR,5,2,3"));

    Ok(())
}

#[test]
fn test_shipments_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("loyalship"));
    cmd.arg("shipments")
        .arg("tests/fixtures/shipments.csv")
        .arg("--fragile")
        .arg("FRG/00001")
        .arg("--priority")
        .arg("PRI/00001");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "identifier,category,distance_km,total_cost,insurance_cost",
        ))
        .stdout(predicate::str::contains("FRG/00001,fragile,10,77000,7000"))
        .stdout(predicate::str::contains("PRI/00001,priority,10,120000,"))
        .stdout(predicate::str::contains(",standard,10,70000,"))
        .stdout(predicate::str::contains("fragile_total,priority_total,grand_total"))
        .stdout(predicate::str::contains("77000,120000,197000"));

    Ok(())
}

#[test]
fn test_shipments_cli_without_selection_totals_zero() {
    let mut cmd = Command::new(cargo_bin!("loyalship"));
    cmd.arg("shipments").arg("tests/fixtures/shipments.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\n0,0,0"));
}

#[test]
fn test_shipments_cli_unknown_identifier_fails() {
    let mut cmd = Command::new(cargo_bin!("loyalship"));
    cmd.arg("shipments")
        .arg("tests/fixtures/shipments.csv")
        .arg("--fragile")
        .arg("FRG/99999");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("FRG/99999"));
}
