use fertmix_rs::mixing::naming::sort_natural;
use fertmix_rs::natural_cmp;
use std::cmp::Ordering;

#[test]
fn jacks_formulas_sort_by_number() {
    let mut names = vec!["Jacks 10-30-20", "Jacks 5-15-26", "Jacks 5-50-18"];
    sort_natural(&mut names);
    assert_eq!(names, ["Jacks 5-15-26", "Jacks 5-50-18", "Jacks 10-30-20"]);
}

#[test]
fn mixed_catalog_order() {
    let mut names = vec![
        "magnesium sulfate".to_string(),
        "CalMag 2".to_string(),
        "Calmag 10".to_string(),
        "MKP".to_string(),
        "10-52-10 Bloom".to_string(),
    ];
    sort_natural(&mut names);
    assert_eq!(
        names,
        ["10-52-10 Bloom", "CalMag 2", "Calmag 10", "magnesium sulfate", "MKP"]
    );
    assert_eq!(natural_cmp("", "A"), Ordering::Less);
}
