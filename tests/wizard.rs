use roof_fastener_configurator::catalog::Catalog;
use roof_fastener_configurator::recommendation::RoofType;
use roof_fastener_configurator::wizard::{
    is_valid_email, reduce, Action, CalculationOutcome, Effect, Stage, ValidationError,
    WizardContext, WizardState,
};

fn apply(
    state: WizardState,
    actions: Vec<Action>,
    ctx: &WizardContext<'_>,
) -> (WizardState, Vec<Effect>) {
    let mut state = state;
    let mut effects = Vec::new();
    for action in actions {
        let t = reduce(&state, action, ctx);
        state = t.state;
        effects.extend(t.effects);
    }
    (state, effects)
}

fn at_roof_step(ctx: &WizardContext<'_>) -> WizardState {
    let (state, _) = apply(
        WizardState::new(),
        vec![
            Action::AcceptDisclaimer,
            Action::SubmitEmail("jan@example.pl".into()),
        ],
        ctx,
    );
    assert_eq!(state.stage, Stage::RoofType);
    state
}

#[test]
fn gates_require_disclaimer_then_valid_email() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);

    let s = WizardState::new();
    assert_eq!(s.stage, Stage::Disclaimer);
    let s = reduce(&s, Action::SubmitEmail("jan@example.pl".into()), &ctx).state;
    assert_eq!(s.stage, Stage::Disclaimer);

    let s = reduce(&s, Action::AcceptDisclaimer, &ctx).state;
    assert_eq!(s.stage, Stage::Email);

    let s = reduce(&s, Action::SubmitEmail("not-an-email".into()), &ctx).state;
    assert_eq!(s.stage, Stage::Email);
    assert_eq!(s.errors.email, Some(ValidationError::InvalidEmail));

    let s = reduce(&s, Action::SubmitEmail(" jan@example.pl\n".into()), &ctx).state;
    assert_eq!(s.stage, Stage::RoofType);
    assert_eq!(s.email, "jan@example.pl");
    assert!(s.errors.is_empty());
}

#[test]
fn email_pattern() {
    assert!(is_valid_email("a@b.pl"));
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("a b@c.pl"));
    assert!(!is_valid_email("@c.pl"));
}

#[test]
fn roof_type_must_be_selected() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let s = at_roof_step(&ctx);
    let s = reduce(&s, Action::SelectRoofType(None), &ctx).state;
    let s = reduce(&s, Action::Next, &ctx).state;
    assert_eq!(s.stage, Stage::RoofType);
    assert_eq!(s.errors.roof_type, Some(ValidationError::MissingRoofType));

    let s = reduce(&s, Action::SelectRoofType(Some(RoofType::Metal)), &ctx).state;
    assert!(s.errors.roof_type.is_none());
    let s = reduce(&s, Action::Next, &ctx).state;
    assert_eq!(s.stage, Stage::NewInsulation);
}

#[test]
fn thickness_floor_is_configurable_and_exclusive() {
    let catalog = Catalog::builtin();
    for floor in [40, 50] {
        let ctx = WizardContext::new(&catalog, floor);
        let (s, _) = apply(
            at_roof_step(&ctx),
            vec![Action::Next, Action::SetNewThickness(floor), Action::Next],
            &ctx,
        );
        assert_eq!(s.stage, Stage::NewInsulation);
        assert_eq!(
            s.errors.new_thickness,
            Some(ValidationError::ThicknessTooSmall { floor_mm: floor })
        );

        let s = reduce(&s, Action::SetNewThickness(floor + 10), &ctx).state;
        assert!(s.errors.new_thickness.is_none());
        let s = reduce(&s, Action::Next, &ctx).state;
        assert_eq!(s.stage, Stage::OldLayers);
    }
}

#[test]
fn calculate_moves_to_results_and_requests_notification() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let (s, effects) = apply(
        at_roof_step(&ctx),
        vec![
            Action::SelectRoofType(Some(RoofType::Concrete)),
            Action::Next,
            Action::SetNewThickness(140),
            Action::Next,
            Action::SetHasOldInsulation(true),
            Action::SetOldThickness(30),
            Action::Calculate,
        ],
        &ctx,
    );
    assert_eq!(s.stage, Stage::Results);
    let rec = s
        .outcome
        .as_ref()
        .and_then(CalculationOutcome::recommendation)
        .expect("matched");
    assert_eq!(rec.tube_name, "LDTK 100");
    assert_eq!(rec.screw_name(), "WDB-6,3x120");

    assert_eq!(effects.len(), 1);
    let Effect::Notify(summary) = &effects[0];
    assert_eq!(summary.email, "jan@example.pl");
    assert_eq!(summary.effective_old_thickness_mm, 30);
    assert_eq!(&summary.recommendation, rec);
}

#[test]
fn no_match_is_a_result_without_notification() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let (s, effects) = apply(
        at_roof_step(&ctx),
        vec![
            Action::Next,
            Action::SetNewThickness(880),
            Action::Next,
            Action::Next,
        ],
        &ctx,
    );
    assert_eq!(s.stage, Stage::Results);
    assert_eq!(s.outcome, Some(CalculationOutcome::NoMatch));
    assert!(effects.is_empty());
}

#[test]
fn back_walks_steps_and_stops_at_first() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let (s, _) = apply(
        at_roof_step(&ctx),
        vec![Action::Next, Action::SetNewThickness(100), Action::Next],
        &ctx,
    );
    assert_eq!(s.stage, Stage::OldLayers);
    let s = reduce(&s, Action::Back, &ctx).state;
    assert_eq!(s.stage, Stage::NewInsulation);
    assert_eq!(s.new_thickness_mm, 100);
    let s = reduce(&s, Action::Back, &ctx).state;
    let s = reduce(&s, Action::Back, &ctx).state;
    assert_eq!(s.stage, Stage::RoofType);
}

#[test]
fn start_over_resets_form_but_keeps_email() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let (s, _) = apply(
        at_roof_step(&ctx),
        vec![
            Action::SelectRoofType(Some(RoofType::Metal)),
            Action::Next,
            Action::SetNewThickness(300),
            Action::Next,
            Action::Calculate,
            Action::StartOver,
        ],
        &ctx,
    );
    assert_eq!(s.stage, Stage::RoofType);
    assert_eq!(s.roof_type, Some(RoofType::Concrete));
    assert_eq!(s.new_thickness_mm, 0);
    assert!(!s.has_old_insulation);
    assert!(s.outcome.is_none());
    assert_eq!(s.email, "jan@example.pl");
}

#[test]
fn reducer_does_not_mutate_previous_state() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let before = at_roof_step(&ctx);
    let snapshot = before.clone();
    let _ = reduce(&before, Action::SelectRoofType(Some(RoofType::Metal)), &ctx);
    assert_eq!(before, snapshot);
}

#[test]
fn metal_calculation_ignores_old_layers() {
    let catalog = Catalog::builtin();
    let ctx = WizardContext::new(&catalog, 40);
    let (s, effects) = apply(
        at_roof_step(&ctx),
        vec![
            Action::SelectRoofType(Some(RoofType::Metal)),
            Action::Next,
            Action::SetNewThickness(600),
            Action::Next,
            Action::SetHasOldInsulation(true),
            Action::SetOldThickness(80),
            Action::Calculate,
        ],
        &ctx,
    );
    let rec = s.outcome.as_ref().and_then(|o| o.recommendation()).expect("matched");
    assert_eq!(rec.anchor_depth_mm, 14);
    assert_eq!(rec.required_screw_length_mm, 80);
    let Effect::Notify(summary) = &effects[0];
    assert_eq!(summary.effective_old_thickness_mm, 0);
}
