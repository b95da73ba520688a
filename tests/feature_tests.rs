//! Integration tests for feature vectors and datasets.

use haxball_corpus::codec;
use haxball_corpus::core::{BallTick, Frame, Match, PlayerTick, Position, Velocity};
use haxball_corpus::features::{
    feature_len, normalize, Dataset, Example, FeatureBuilder, FeatureError, FeatureVector,
    HEAD_LEN, PLAYER_SLOTS,
};
use haxball_corpus::inference::{control_input, FnModel, Pilot};
use proptest::prelude::*;

fn ball() -> BallTick {
    BallTick::new(Position::new(0.0, 0.0), Velocity::new(2.0, -1.0))
}

fn three_player_frame() -> Frame {
    Frame::new(120, ball())
        .with_player(PlayerTick::new(1, 1).with_input(5).at(-300.0, 100.0).moving(1.0, 0.0))
        .with_player(PlayerTick::new(2, 2).with_input(12).at(300.0, -100.0).moving(-1.0, 0.5))
        .with_player(PlayerTick::new(3, 1).with_input(31).at(50.0, 0.0).moving(0.0, 0.0))
}

// =============================================================================
// Normalization Tests
// =============================================================================

#[test]
fn test_normalize_reference_values() {
    assert_eq!(normalize(&[1.0, 2.0, 3.0]).unwrap(), vec![0.0, 0.5, 1.0]);
    assert_eq!(normalize(&[5.0, 5.0, 5.0]).unwrap(), vec![0.5, 0.5, 0.5]);
}

#[test]
fn test_normalize_single_value() {
    assert_eq!(normalize(&[42.0]).unwrap(), vec![0.5]);
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_ball_plus_three_players_is_19() {
    let frame = three_player_frame();
    let v = FeatureBuilder::new()
        .build(&frame.ball, &frame.players[0], &frame.players[1..])
        .unwrap();

    assert_eq!(v.len(), 19);
    assert_eq!(v.len(), feature_len(3));
}

#[test]
fn test_team_bit_follows_each_block() {
    let frame = three_player_frame();
    let v = FeatureBuilder::new()
        .build(&frame.ball, &frame.players[0], &frame.players[1..])
        .unwrap();
    let values = v.as_slice();

    // current (team 1), then other1 (team 2), then other2 (team 1)
    assert_eq!(values[HEAD_LEN + 4], 1.0);
    assert_eq!(values[HEAD_LEN + PLAYER_SLOTS + 4], 0.0);
    assert_eq!(values[HEAD_LEN + 2 * PLAYER_SLOTS + 4], 1.0);
}

#[test]
fn test_head_interleaves_position_and_velocity() {
    let frame = three_player_frame();
    let builder = FeatureBuilder::new();
    let v = builder
        .build(&frame.ball, &frame.players[0], &frame.players[1..])
        .unwrap();

    let positions = normalize(&[0.0, 0.0, -300.0, 100.0, 300.0, -100.0, 50.0, 0.0]).unwrap();
    let velocities = normalize(&[2.0, -1.0, 1.0, 0.0, -1.0, 0.5, 0.0, 0.0]).unwrap();

    assert_eq!(
        &v.as_slice()[..HEAD_LEN],
        &[positions[0], velocities[0], positions[1], velocities[1]]
    );
    assert_eq!(
        &v.as_slice()[HEAD_LEN..HEAD_LEN + 4],
        &[positions[2], velocities[2], positions[3], velocities[3]]
    );
}

#[test]
fn test_others_order_matters() {
    let frame = three_player_frame();
    let builder = FeatureBuilder::new();
    let forward = builder
        .build(&frame.ball, &frame.players[0], [&frame.players[1], &frame.players[2]])
        .unwrap();
    let reversed = builder
        .build(&frame.ball, &frame.players[0], [&frame.players[2], &frame.players[1]])
        .unwrap();

    assert_ne!(forward, reversed);
    assert_eq!(forward.team_indicator(1), Some(0.0));
    assert_eq!(reversed.team_indicator(1), Some(1.0));
}

#[test]
fn test_nan_is_rejected_not_coerced() {
    let current = PlayerTick::new(1, 1).moving(0.0, f64::NAN);
    let err = FeatureBuilder::new().build(&ball(), &current, []).unwrap_err();

    assert!(matches!(err, FeatureError::InvalidFeatureInput { .. }));
}

#[test]
fn test_extreme_finite_state_builds_finite_vector() {
    let current = PlayerTick::new(1, 1).at(1e308, -1e308);
    let v = FeatureBuilder::new().build(&BallTick::default(), &current, []).unwrap();

    assert_eq!(v.len(), feature_len(1));
    assert!(v.as_slice().iter().all(|x| (0.0..=1.0).contains(x)));
    assert_eq!(v.as_slice()[HEAD_LEN], 1.0);
    assert_eq!(v.as_slice()[HEAD_LEN + 2], 0.0);
}

// =============================================================================
// Training / Inference Parity
// =============================================================================

#[test]
fn test_decoded_and_live_vectors_identical() {
    // values representable in f32 so the codec is lossless
    let live = three_player_frame();
    let stored = codec::decode(&codec::encode(&Match::from(vec![live.clone()]))).unwrap();
    let stored = &stored.frames[0];
    let builder = FeatureBuilder::new();

    let training: Vec<Example> = builder
        .examples(stored)
        .collect::<Result<_, _>>()
        .unwrap();

    for (i, current) in live.players.iter().enumerate() {
        let others = live.players.iter().filter(|p| p.id != current.id);
        let inference = builder.build(&live.ball, current, others).unwrap();

        assert_eq!(training[i].features, inference);
        let bits_equal = training[i]
            .features
            .as_slice()
            .iter()
            .zip(inference.as_slice())
            .all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(bits_equal);
    }
}

#[test]
fn test_pilot_matches_training_target_path() {
    let frame = three_player_frame();
    let builder = FeatureBuilder::new();
    // echo the last team bit scaled into the control range
    let model = FnModel::new(|x: &[f64]| x[x.len() - 1] * 31.0);
    let pilot = Pilot::new(builder, model);

    let example = builder.examples(&frame).next().unwrap().unwrap();
    let expected = control_input(example.features.as_slice()[18] * 31.0);

    assert_eq!(pilot.act_on_frame(&frame, 1).unwrap(), Some(expected));
}

// =============================================================================
// Dataset Tests
// =============================================================================

#[test]
fn test_dataset_from_frame_examples() {
    let frame = three_player_frame();
    let mut ds = Dataset::new(feature_len(3));
    for example in FeatureBuilder::new().examples(&frame) {
        ds.push(example.unwrap()).unwrap();
    }

    assert_eq!(ds.shape(), [3, 19]);
    assert_eq!(ds.targets(), &[5.0, 12.0, 31.0]);
}

#[test]
fn test_dataset_split_and_sample() {
    let mut ds = Dataset::new(1);
    for i in 0..100 {
        ds.push_row(&[f64::from(i)], f64::from(i)).unwrap();
    }

    let (train, validation) = ds.validation_split(0.2);
    assert_eq!(train.len(), 80);
    assert_eq!(validation.targets()[0], 80.0);

    let batch = train.sample_batch(32, 7);
    assert_eq!(batch.len(), 32);
    assert!(batch.targets().iter().all(|&t| t < 80.0));
    assert_eq!(batch, train.sample_batch(32, 7));
    assert_ne!(batch, train.sample_batch(32, 8));
}

#[test]
fn test_feature_vector_serializes_as_array() {
    let v = FeatureVector::from(vec![0.0, 0.5, 1.0]);
    assert_eq!(serde_json::to_string(&v).unwrap(), "[0.0,0.5,1.0]");
}

// =============================================================================
// Feature Properties
// =============================================================================

fn coord() -> impl Strategy<Value = f64> {
    -1000.0f64..1000.0
}

fn player_strategy() -> impl Strategy<Value = PlayerTick> {
    (1i32..3, coord(), coord(), coord(), coord()).prop_map(|(team, px, py, vx, vy)| {
        PlayerTick::new(0, team).at(px, py).moving(vx, vy)
    })
}

proptest! {
    #[test]
    fn prop_shape_and_ranges(
        ball in (coord(), coord(), coord(), coord()),
        current in player_strategy(),
        others in prop::collection::vec(player_strategy(), 0..6),
    ) {
        let ball = BallTick::new(Position::new(ball.0, ball.1), Velocity::new(ball.2, ball.3));
        let v = FeatureBuilder::new().build(&ball, &current, &others).unwrap();

        prop_assert_eq!(v.len(), feature_len(others.len() + 1));
        prop_assert!(v.as_slice().iter().all(|x| (0.0..=1.0).contains(x)));
        for slot in 0..=others.len() {
            let bit = v.team_indicator(slot).unwrap();
            prop_assert!(bit == 0.0 || bit == 1.0);
        }
    }

    #[test]
    fn prop_builder_is_deterministic(
        current in player_strategy(),
        others in prop::collection::vec(player_strategy(), 0..6),
    ) {
        let builder = FeatureBuilder::new();
        let a = builder.build(&ball(), &current, &others).unwrap();
        let b = builder.build(&ball(), &current, &others).unwrap();
        prop_assert_eq!(a, b);
    }
}
