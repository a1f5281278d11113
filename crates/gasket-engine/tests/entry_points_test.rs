use gasket_abi::{BorrowedView, ExecutionParams, RawBuffer, UserStatus};
use gasket_engine::{gasket_call, gasket_compile, gasket_free};

const MINIMAL_WASM: &[u8] = b"\0asm\x01\0\0\0";

const ECHO: &str = r#"
(module
  (import "host" "read_args" (func $read_args (param i32)))
  (import "host" "write_result" (func $write_result (param i32 i32)))
  (memory (export "memory") 1)
  (func (export "user_entrypoint") (param $len i32) (result i32)
    (call $read_args (i32.const 0))
    (call $write_result (i32.const 0) (local.get $len))
    (i32.const 0)))
"#;

const REVERT: &str = r#"
(module
  (import "host" "read_args" (func $read_args (param i32)))
  (import "host" "write_result" (func $write_result (param i32 i32)))
  (memory (export "memory") 1)
  (func (export "user_entrypoint") (param $len i32) (result i32)
    (call $read_args (i32.const 0))
    (call $write_result (i32.const 0) (local.get $len))
    (i32.const 1)))
"#;

const SPIN: &str = r#"
(module
  (memory (export "memory") 1)
  (func (export "user_entrypoint") (param i32) (result i32)
    (loop $spin (br $spin))
    (i32.const 0)))
"#;

const RECURSE: &str = r#"
(module
  (memory (export "memory") 1)
  (func $deeper (param i64) (result i64)
    (call $deeper (i64.add (local.get 0) (i64.const 1))))
  (func (export "user_entrypoint") (param i32) (result i32)
    (drop (call $deeper (i64.const 0)))
    (i32.const 0)))
"#;

const GAS_LEFT: &str = r#"
(module
  (import "host" "write_result" (func $write_result (param i32 i32)))
  (import "host" "gas_left" (func $gas_left (result i64)))
  (memory (export "memory") 1)
  (func (export "user_entrypoint") (param i32) (result i32)
    (i64.store (i32.const 0) (call $gas_left))
    (call $write_result (i32.const 0) (i32.const 8))
    (i32.const 0)))
"#;

const BIG_MEMORY: &str = r#"
(module
  (memory (export "memory") 8)
  (func (export "user_entrypoint") (param i32) (result i32)
    (i32.const 0)))
"#;

/// Host-side cells the engine writes its output into.
struct Output {
    ptr: *mut u8,
    len: usize,
    cap: usize,
}

impl Output {
    fn new() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }

    fn raw(&mut self) -> RawBuffer {
        RawBuffer {
            ptr: &mut self.ptr,
            len: &mut self.len,
            cap: &mut self.cap,
        }
    }

    fn take(mut self) -> Vec<u8> {
        let data = if self.ptr.is_null() {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }.to_vec()
        };
        unsafe { gasket_free(self.raw()) };
        data
    }
}

fn params() -> ExecutionParams {
    ExecutionParams {
        wasm_gas_price: 1,
        hostio_cost: 0,
        ..ExecutionParams::default()
    }
}

fn compile(wasm: &[u8], params: &ExecutionParams) -> (u8, Vec<u8>) {
    let mut output = Output::new();
    let status =
        unsafe { gasket_compile(BorrowedView::new(wasm), params.encode(), output.raw()) };
    (status, output.take())
}

fn call(module: &[u8], calldata: &[u8], params: &ExecutionParams, gas: &mut u64) -> (u8, Vec<u8>) {
    let mut output = Output::new();
    let status = unsafe {
        gasket_call(
            BorrowedView::new(module),
            BorrowedView::new(calldata),
            params.encode(),
            output.raw(),
            gas,
        )
    };
    (status, output.take())
}

fn compiled(wat: &str, params: &ExecutionParams) -> Vec<u8> {
    let (status, module) = compile(wat.as_bytes(), params);
    assert_eq!(status, UserStatus::Success.code(), "{}", String::from_utf8_lossy(&module));
    module
}

#[test]
fn minimal_module_compiles() {
    let (status, module) = compile(MINIMAL_WASM, &params());
    assert_eq!(status, UserStatus::Success.code());
    assert!(!module.is_empty());
}

#[test]
fn malformed_module_fails_with_diagnostic() {
    let (status, message) = compile(b"\0asm\x01\0\0\0\x01\xff\xff", &params());
    assert_eq!(status, UserStatus::Failure.code());
    assert!(!message.is_empty());
}

#[test]
fn unsupported_version_fails() {
    let params = ExecutionParams {
        version: 9,
        ..params()
    };
    let (status, message) = compile(MINIMAL_WASM, &params);
    assert_eq!(status, UserStatus::Failure.code());
    assert_eq!(message, b"unsupported module version 9");
}

#[test]
fn echo_returns_calldata() {
    let params = params();
    let module = compiled(ECHO, &params);

    let mut gas = 10_000;
    let (status, output) = call(&module, b"hello engine", &params, &mut gas);
    assert_eq!(status, UserStatus::Success.code());
    assert_eq!(output, b"hello engine");
    assert!(gas < 10_000);
}

#[test]
fn revert_returns_payload_and_charges_gas() {
    let params = params();
    let module = compiled(REVERT, &params);

    let mut gas = 10_000;
    let (status, output) = call(&module, b"nope", &params, &mut gas);
    assert_eq!(status, UserStatus::Revert.code());
    assert_eq!(output, b"nope");
    assert!(gas < 10_000);
}

#[test]
fn spinning_program_runs_out_of_gas() {
    let params = params();
    let module = compiled(SPIN, &params);

    let mut gas = 5_000;
    let (status, output) = call(&module, &[], &params, &mut gas);
    assert_eq!(status, UserStatus::OutOfGas.code());
    assert!(output.is_empty());
    assert_eq!(gas, 0);
}

#[test]
fn unbounded_recursion_runs_out_of_stack() {
    let params = ExecutionParams {
        max_depth: 32,
        max_frame_size: 512,
        ..params()
    };
    let module = compiled(RECURSE, &params);

    let mut gas = 1_000_000_000;
    let (status, _) = call(&module, &[], &params, &mut gas);
    assert_eq!(status, UserStatus::OutOfStack.code());
    assert!(gas < 1_000_000_000);
}

#[test]
fn hostio_cost_is_charged_per_hook() {
    let cheap = params();
    let dear = ExecutionParams {
        hostio_cost: 1_000,
        ..params()
    };
    let module = compiled(ECHO, &cheap);

    let mut cheap_gas = 100_000;
    let (status, _) = call(&module, b"abc", &cheap, &mut cheap_gas);
    assert_eq!(status, UserStatus::Success.code());

    let mut dear_gas = 100_000;
    let (status, _) = call(&module, b"abc", &dear, &mut dear_gas);
    assert_eq!(status, UserStatus::Success.code());

    assert_eq!(cheap_gas - dear_gas, 2 * 1_000);
}

#[test]
fn charge_rounds_consumed_fuel_up_to_whole_gas() {
    let unit = ExecutionParams {
        hostio_cost: 3,
        ..params()
    };
    let module = compiled(ECHO, &unit);

    // At one fuel per gas the charge is the exact fuel consumed.
    let mut gas = 100_000;
    let (status, _) = call(&module, b"abc", &unit, &mut gas);
    assert_eq!(status, UserStatus::Success.code());
    let fuel = 100_000 - gas;
    assert!(fuel > 6);

    for price in [2, 7, 10, 1_000] {
        let priced = ExecutionParams {
            wasm_gas_price: price,
            ..unit
        };
        let mut gas = 100_000;
        let (status, _) = call(&module, b"abc", &priced, &mut gas);
        assert_eq!(status, UserStatus::Success.code());
        assert_eq!(100_000 - gas, fuel.div_ceil(price), "price {price}");
    }
}

#[test]
fn huge_balance_at_default_price_is_barely_charged() {
    let params = ExecutionParams {
        hostio_cost: 0,
        ..ExecutionParams::default()
    };
    let module = compiled(ECHO, &params);

    let before = u64::MAX / 2;
    let mut gas = before;
    let (status, output) = call(&module, b"x", &params, &mut gas);
    assert_eq!(status, UserStatus::Success.code());
    assert_eq!(output, b"x");
    assert_eq!(before - gas, 1);
}

#[test]
fn hook_cost_above_balance_is_out_of_gas() {
    let params = ExecutionParams {
        hostio_cost: 1_000_000,
        ..params()
    };
    let module = compiled(ECHO, &params);

    let mut gas = 500;
    let (status, _) = call(&module, b"abc", &params, &mut gas);
    assert_eq!(status, UserStatus::OutOfGas.code());
    assert_eq!(gas, 0);
}

#[test]
fn gas_left_reports_remaining_balance() {
    let params = ExecutionParams {
        wasm_gas_price: 10,
        ..params()
    };
    let module = compiled(GAS_LEFT, &params);

    let mut gas = 50_000;
    let (status, output) = call(&module, &[], &params, &mut gas);
    assert_eq!(status, UserStatus::Success.code());

    let seen = i64::from_le_bytes(output.as_slice().try_into().unwrap());
    assert!(seen > 0);
    assert!(seen as u64 <= 50_000);
    assert!(gas <= seen as u64);
}

#[test]
fn memory_above_heap_bound_fails() {
    let params = ExecutionParams {
        heap_bound: 2,
        ..params()
    };
    let module = compiled(BIG_MEMORY, &params);

    let mut gas = 10_000;
    let (status, message) = call(&module, &[], &params, &mut gas);
    assert_eq!(status, UserStatus::Failure.code());
    assert!(!message.is_empty());
}

#[test]
fn module_without_entrypoint_fails() {
    let params = params();
    let (_, module) = compile(MINIMAL_WASM, &params);

    let mut gas = 10_000;
    let (status, message) = call(&module, &[], &params, &mut gas);
    assert_eq!(status, UserStatus::Failure.code());
    assert!(String::from_utf8_lossy(&message).contains("user_entrypoint"));
}

#[test]
fn null_gas_cell_fails_without_touching_memory() {
    let params = params();
    let module = compiled(ECHO, &params);

    let mut output = Output::new();
    let status = unsafe {
        gasket_call(
            BorrowedView::new(&module),
            BorrowedView::new(&[]),
            params.encode(),
            output.raw(),
            std::ptr::null_mut(),
        )
    };
    assert_eq!(status, UserStatus::Failure.code());
    assert_eq!(output.take(), b"invalid params: null gas cell");
}

#[test]
fn free_is_idempotent() {
    let mut output = Output::new();
    let status =
        unsafe { gasket_compile(BorrowedView::new(MINIMAL_WASM), params().encode(), output.raw()) };
    assert_eq!(status, UserStatus::Success.code());

    unsafe {
        gasket_free(output.raw());
        gasket_free(output.raw());
    }
    assert!(output.ptr.is_null());
    assert_eq!(output.len, 0);
    assert_eq!(output.cap, 0);
}
