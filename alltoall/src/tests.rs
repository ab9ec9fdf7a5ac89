use mpi_config::{run_local_world, LocalConfig, MPIEngine};

use crate::*;

fn layout(world_size: usize, elements_per_chunk: usize) -> ChunkLayout {
    ChunkLayout::new(world_size, elements_per_chunk).unwrap()
}

#[test]
fn test_payload_formula() {
    for world_size in 1..=4 {
        for elements_per_chunk in [0, 1, 3, 8] {
            let layout = layout(world_size, elements_per_chunk);
            for rank in 0..world_size {
                let payload = generate_payload::<i64>(rank, &layout);
                assert_eq!(payload.len(), world_size * elements_per_chunk);
                payload.iter().enumerate().for_each(|(o, v)| {
                    assert_eq!(*v, (rank * world_size * elements_per_chunk + o) as i64);
                });
            }
        }
    }
}

#[test]
fn test_payload_two_rank_scenario() {
    let config = BenchConfig::single_shot(Backend::Local, DType::Int32, 16);
    let layout = config.validate(2).unwrap();
    assert_eq!(layout.elements_per_chunk, 4);
    assert_eq!(layout.total_elems(), 8);

    assert_eq!(
        generate_payload::<i32>(0, &layout),
        vec![0, 1, 2, 3, 4, 5, 6, 7]
    );
    assert_eq!(
        generate_payload::<i32>(1, &layout),
        vec![8, 9, 10, 11, 12, 13, 14, 15]
    );
}

#[test]
fn test_float_payload_is_integer_valued() {
    let layout = layout(3, 5);
    let payload = generate_payload::<f32>(2, &layout);
    assert_eq!(payload[0], 30.0);
    assert_eq!(payload[14], 44.0);
}

#[test]
fn test_expected_output_index() {
    let layout = layout(2, 4);
    let rank_0: Vec<u64> = (0..8).map(|o| expected_output_index(0, o, &layout)).collect();
    let rank_1: Vec<u64> = (0..8).map(|o| expected_output_index(1, o, &layout)).collect();
    assert_eq!(rank_0, vec![0, 1, 2, 3, 8, 9, 10, 11]);
    assert_eq!(rank_1, vec![4, 5, 6, 7, 12, 13, 14, 15]);
}

#[test]
fn test_indivisible_msg_bytes_rejected_for_every_dtype() {
    for dtype in DType::ALL {
        let msg_bytes = dtype.size() * 10 + 1;
        let config = BenchConfig::single_shot(Backend::Mpi, dtype, msg_bytes);
        match config.validate(2) {
            Err(ConfigError::IndivisibleMessage {
                msg_bytes: m,
                elem_size,
            }) => {
                assert_eq!(m, msg_bytes);
                assert_eq!(elem_size, dtype.size());
            }
            other => panic!("{dtype}: expected IndivisibleMessage, got {other:?}"),
        }
    }

    let config = BenchConfig::single_shot(Backend::Mpi, DType::Int64, 12);
    assert!(config.validate(2).is_err());
    let config = BenchConfig::single_shot(Backend::Mpi, DType::Int32, 12);
    assert_eq!(config.validate(2).unwrap().elements_per_chunk, 3);
}

#[test]
fn test_pair_variant_requires_two_ranks() {
    for world_size in [1, 3, 4, 8] {
        let config = BenchConfig::pair(Backend::Local, DType::Float32, 64, 5);
        assert!(matches!(
            config.validate(world_size),
            Err(ConfigError::WorldSizeMismatch { expected: 2, actual }) if actual == world_size
        ));
    }
    let config = BenchConfig::pair(Backend::Local, DType::Float32, 64, 5);
    assert_eq!(config.validate(2).unwrap().elements_per_chunk, 16);
}

#[test]
fn test_zero_iterations_rejected() {
    let config = BenchConfig::pair(Backend::Local, DType::Int32, 16, 0);
    assert!(matches!(
        config.validate(2),
        Err(ConfigError::ZeroIterations)
    ));
}

#[test]
fn test_layout_overflow_rejected() {
    assert!(matches!(
        ChunkLayout::new(usize::MAX, 2),
        Err(ConfigError::PayloadTooLarge { .. })
    ));
}

#[test]
fn test_backend_from_str() {
    assert_eq!("mpi".parse::<Backend>().unwrap(), Backend::Mpi);
    assert_eq!("local".parse::<Backend>().unwrap(), Backend::Local);
    assert!(matches!(
        "nccl".parse::<Backend>(),
        Err(ConfigError::UnknownBackend(_))
    ));
}

#[test]
fn test_verifier_accepts_correct_output() {
    let layout = layout(2, 4);
    let verifier = Verifier::new(1, layout);
    let output: Vec<i32> = vec![4, 5, 6, 7, 12, 13, 14, 15];

    let verification = verifier.verify(&output);
    assert!(verification.is_ok());
    assert_eq!(verification.sample.numel, 8);
    assert_eq!(verification.sample.first, vec![4, 5, 6, 7]);
    assert_eq!(verification.sample.last, vec![12, 13, 14, 15]);
}

#[test]
fn test_verifier_catches_swapped_chunks() {
    let layout = layout(2, 4);
    let verifier = Verifier::new(0, layout);
    // chunks placed in the wrong order
    let output: Vec<i32> = vec![8, 9, 10, 11, 0, 1, 2, 3];

    let verification = verifier.verify(&output);
    assert!(!verification.is_ok());
    assert_eq!(verification.mismatches.len(), 8);
    assert_eq!(
        verification.mismatches[0],
        Mismatch {
            offset: 0,
            expected: 0,
            actual: 8
        }
    );
}

#[test]
fn test_verifier_catches_wrong_size() {
    let layout = layout(2, 4);
    let verifier = Verifier::new(0, layout);
    let output: Vec<i64> = vec![0, 1, 2, 3, 8, 9];

    let verification = verifier.verify(&output);
    assert!(!verification.is_ok());
    assert_eq!(verification.sample.numel, 6);
    assert_eq!(verification.expected_numel, 8);
}

#[test]
fn test_verifier_short_buffers() {
    let layout = layout(1, 2);
    let verifier = Verifier::new(0, layout);
    let verification = verifier.verify(&[0.0f32, 1.0]);
    assert!(verification.is_ok());
    assert_eq!(verification.sample.first, vec![0.0, 1.0]);
    assert_eq!(verification.sample.last, vec![0.0, 1.0]);

    let empty = Verifier::new(0, self::layout(3, 0));
    let verification = empty.verify::<i32>(&[]);
    assert!(verification.is_ok());
    assert!(verification.sample.first.is_empty());

    let narrow = Verifier::new(0, self::layout(2, 8)).with_sample_len(1);
    let sample = narrow.sample(&generate_payload::<i32>(0, &self::layout(2, 8)));
    assert_eq!(sample.first, vec![0]);
    assert_eq!(sample.last, vec![15]);
}

#[test]
fn test_exchange_rejects_wrong_buffer_size() {
    let engine = LocalConfig::single();
    let client = ExchangeClient::new(&engine, layout(1, 4));
    let payload = vec![0i32; 3];
    let mut output = client.allocate_output::<i32>();
    assert!(matches!(
        client.exchange(&payload, &mut output),
        Err(BenchError::BufferSize {
            expected: 4,
            actual: 3
        })
    ));
}

#[test]
fn test_exchange_round_trip_on_local_world() {
    const WORLD_SIZE: usize = 4;
    const ELEMENTS_PER_CHUNK: usize = 6;

    let outputs = run_local_world(WORLD_SIZE, |engine| {
        let layout = layout(engine.world_size(), ELEMENTS_PER_CHUNK);
        let client = ExchangeClient::new(engine, layout);
        let payload = generate_payload::<i64>(engine.world_rank(), &layout);
        let mut output = client.allocate_output::<i64>();
        client.exchange(&payload, &mut output).unwrap();
        output
    })
    .unwrap();

    let total = WORLD_SIZE * ELEMENTS_PER_CHUNK;
    for (r, output) in outputs.iter().enumerate() {
        for (i, chunk) in output.chunks(ELEMENTS_PER_CHUNK).enumerate() {
            for (j, v) in chunk.iter().enumerate() {
                assert_eq!(*v, (i * total + r * ELEMENTS_PER_CHUNK + j) as i64);
            }
        }
    }
}

#[test]
fn test_timer_measures_the_operation() {
    let engine = LocalConfig::single();
    let timer = BarrierTimer::new(&engine);
    let timed = timer
        .measure(|| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(7)
        })
        .unwrap();
    assert_eq!(timed.value, 7);
    assert!(timed.elapsed_ms >= 20.0);
}

#[test]
fn test_timer_propagates_errors() {
    let engine = LocalConfig::single();
    let timer = BarrierTimer::new(&engine);
    let result: BenchResult<Timed<()>> =
        timer.measure(|| Err(ConfigError::ZeroIterations.into()));
    assert!(matches!(
        result,
        Err(BenchError::Config(ConfigError::ZeroIterations))
    ));
}

#[test]
fn test_launch_env_parsing() {
    let env = LaunchEnv::from_lookup(|key| match key {
        "RANK" => Some("1".to_string()),
        "WORLD_SIZE" => Some("2".to_string()),
        "LOCAL_RANK" => Some("not-a-number".to_string()),
        "MASTER_ADDR" => Some("10.0.0.1".to_string()),
        _ => None,
    });
    assert_eq!(env.rank, Some(1));
    assert_eq!(env.world_size, Some(2));
    assert_eq!(env.local_rank, None);
    assert_eq!(env.master_addr, "10.0.0.1");
    assert_eq!(env.master_port, LaunchEnv::DEFAULT_MASTER_PORT);

    assert!(env.mismatches(1, 2).is_empty());
    assert_eq!(env.mismatches(0, 4).len(), 2);

    let empty = LaunchEnv::from_lookup(|_| None);
    assert_eq!(empty.master_addr, LaunchEnv::DEFAULT_MASTER_ADDR);
    assert!(empty.mismatches(3, 7).is_empty());
}

#[test]
fn test_launch_report_line() {
    let env = LaunchEnv::from_lookup(|key| match key {
        "RANK" => Some("1".to_string()),
        "WORLD_SIZE" => Some("2".to_string()),
        "MASTER_ADDR" => Some("10.0.0.1".to_string()),
        "MASTER_PORT" => Some("29501".to_string()),
        _ => None,
    });
    let line = env.report_line(1);
    assert!(line.contains("Rank 1: Initializing with"));
    assert!(line.ends_with(
        "MASTER_ADDR=10.0.0.1, MASTER_PORT=29501, WORLD_SIZE=2, RANK=1, LOCAL_RANK=unset"
    ));

    let defaults = LaunchEnv::from_lookup(|_| None).report_line(0);
    assert!(defaults.contains("MASTER_ADDR=localhost, MASTER_PORT=29500, WORLD_SIZE=unset"));
}
