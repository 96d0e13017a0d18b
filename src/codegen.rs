//! Code generation: lower the syntax tree into LLVM-flavoured textual IR.
//!
//! The emitter is a second recursive walk over the completed tree. All
//! mutable state lives in one generator value: the output buffer, the map
//! from variable names to storage slots, and the temporary and label
//! counters. Temporaries (`%0`, `%1`, ...) and labels (`label0`, ...) are
//! numbered from zero and never reused within one run. Indentation tracks
//! structural nesting for readability only.
//!
//! Storage for a named variable is allocated the first time the variable is
//! touched, by read or write alike; the language has no declarations, so
//! this lazy allocation is the only declaration mechanism. Reading a
//! variable that was never assigned loads an indeterminate slot without
//! complaint.

use std::collections::HashMap;

use crate::parser::{BinaryOp, CompOp, Cond, Expr, Instruction, Program};

/// Fixed preamble: external primitives plus the `readInt`/`println`
/// helpers, identical for every compiled program.
const PREAMBLE: &str = r#"; external primitives
declare i32 @getchar()
declare i32 @putchar(i32)
declare i32 @printf(i8*, ...)
declare i32 @scanf(i8*, ...)

; read one integer from stdin
@.strR = private unnamed_addr constant [3 x i8] c"%d\00", align 1

define i32 @readInt() {
  %1 = alloca i32, align 4
  %2 = call i32 (i8*, ...) @scanf(i8* getelementptr inbounds ([3 x i8], [3 x i8]* @.strR, i32 0, i32 0), i32* %1)
  %3 = load i32, i32* %1, align 4
  ret i32 %3
}

; write one integer and a newline to stdout
@.strP = private unnamed_addr constant [4 x i8] c"%d\0A\00", align 1

define void @println(i32 %x) {
  %1 = alloca i32, align 4
  store i32 %x, i32* %1, align 4
  %2 = load i32, i32* %1, align 4
  %3 = call i32 (i8*, ...) @printf(i8* getelementptr inbounds ([4 x i8], [4 x i8]* @.strP, i32 0, i32 0), i32 %2)
  ret void
}

"#;

/// Emit IR text for a whole program.
pub fn generate(program: &Program) -> String {
  Generator::new().run(program)
}

struct Generator {
  code: String,
  storage: HashMap<String, String>,
  temp_counter: usize,
  label_counter: usize,
  indent: usize,
}

impl Generator {
  fn new() -> Self {
    Self {
      code: String::new(),
      storage: HashMap::new(),
      temp_counter: 0,
      label_counter: 0,
      indent: 0,
    }
  }

  fn run(mut self, program: &Program) -> String {
    self.code.push_str(PREAMBLE);
    self.emit("define i32 @main() {");
    self.emit("entry:");
    self.indent += 1;
    self.gen_body(&program.body);
    self.emit("ret i32 0");
    self.indent -= 1;
    self.emit("}");
    self.code
  }

  /// Append one line at the current indent level.
  fn emit(&mut self, line: &str) {
    for _ in 0..self.indent {
      self.code.push_str("  ");
    }
    self.code.push_str(line);
    self.code.push('\n');
  }

  fn new_temp(&mut self) -> String {
    let id = format!("%{}", self.temp_counter);
    self.temp_counter += 1;
    id
  }

  fn new_label(&mut self) -> String {
    let id = format!("label{}", self.label_counter);
    self.label_counter += 1;
    id
  }

  /// Storage slot for a named variable. The first touch emits the
  /// allocation; later calls return the same slot without re-emitting.
  fn storage_for(&mut self, name: &str) -> String {
    if let Some(slot) = self.storage.get(name) {
      return slot.clone();
    }
    let slot = format!("%var_{name}");
    self.storage.insert(name.to_string(), slot.clone());
    self.emit(&format!("{slot} = alloca i32"));
    slot
  }

  /// Load a named variable into a fresh temporary.
  fn load(&mut self, name: &str) -> String {
    let slot = self.storage_for(name);
    let temp = self.new_temp();
    self.emit(&format!("{temp} = load i32, i32* {slot}"));
    temp
  }

  /// Store a temporary into a named variable's slot.
  fn store(&mut self, name: &str, temp: &str) {
    let slot = self.storage_for(name);
    self.emit(&format!("store i32 {temp}, i32* {slot}"));
  }

  fn gen_body(&mut self, body: &[Instruction]) {
    for instruction in body {
      self.gen_instruction(instruction);
    }
  }

  fn gen_instruction(&mut self, instruction: &Instruction) {
    match instruction {
      Instruction::Assign { name, value } => {
        let temp = self.gen_expr(value);
        self.store(name, &temp);
      }
      Instruction::If {
        cond,
        then_body,
        else_body,
      } => self.gen_if(cond, then_body, else_body.as_deref()),
      Instruction::While { cond, body } => self.gen_while(cond, body),
      Instruction::Print { name } => {
        let temp = self.load(name);
        self.emit(&format!("call void @println(i32 {temp})"));
      }
      Instruction::Read { name } => {
        let temp = self.new_temp();
        self.emit(&format!("{temp} = call i32 @readInt()"));
        self.store(name, &temp);
      }
    }
  }

  /// Both branch targets are emitted even without an `Else` clause, so the
  /// conditional branch always lands on defined labels.
  fn gen_if(&mut self, cond: &Cond, then_body: &[Instruction], else_body: Option<&[Instruction]>) {
    let flag = self.gen_cond(cond);
    let then_label = self.new_label();
    let else_label = self.new_label();
    let end_label = self.new_label();

    self.emit(&format!(
      "br i1 {flag}, label %{then_label}, label %{else_label}"
    ));
    self.emit(&format!("{then_label}:"));
    self.indent += 1;
    self.gen_body(then_body);
    self.emit(&format!("br label %{end_label}"));
    self.indent -= 1;
    self.emit(&format!("{else_label}:"));
    if let Some(body) = else_body {
      self.indent += 1;
      self.gen_body(body);
      self.indent -= 1;
    }
    self.emit(&format!("{end_label}:"));
  }

  /// Pre-test loop: the condition block is branched to before the body
  /// ever runs, and re-evaluated after every iteration.
  fn gen_while(&mut self, cond: &Cond, body: &[Instruction]) {
    let cond_label = self.new_label();
    let body_label = self.new_label();
    let end_label = self.new_label();

    self.emit(&format!("br label %{cond_label}"));
    self.emit(&format!("{cond_label}:"));
    self.indent += 1;
    let flag = self.gen_cond(cond);
    self.emit(&format!(
      "br i1 {flag}, label %{body_label}, label %{end_label}"
    ));
    self.indent -= 1;
    self.emit(&format!("{body_label}:"));
    self.indent += 1;
    self.gen_body(body);
    self.emit(&format!("br label %{cond_label}"));
    self.indent -= 1;
    self.emit(&format!("{end_label}:"));
  }

  fn gen_cond(&mut self, cond: &Cond) -> String {
    match cond {
      Cond::Compare { op, lhs, rhs } => {
        let lhs_temp = self.gen_expr(lhs);
        let rhs_temp = self.gen_expr(rhs);
        let predicate = match op {
          CompOp::Eq => "eq",
          CompOp::Lt => "slt",
          CompOp::Le => "sle",
        };
        let temp = self.new_temp();
        self.emit(&format!(
          "{temp} = icmp {predicate} i32 {lhs_temp}, {rhs_temp}"
        ));
        temp
      }
      // `a -> b` is lowered as boolean algebra, `(not a) or b`; both sides
      // are always evaluated, never short-circuited.
      Cond::Implies { lhs, rhs } => {
        let lhs_temp = self.gen_cond(lhs);
        let not_lhs = self.new_temp();
        self.emit(&format!("{not_lhs} = xor i1 {lhs_temp}, true"));
        let rhs_temp = self.gen_cond(rhs);
        let temp = self.new_temp();
        self.emit(&format!("{temp} = or i1 {not_lhs}, {rhs_temp}"));
        temp
      }
    }
  }

  fn gen_expr(&mut self, expr: &Expr) -> String {
    match expr {
      // materialise the literal so every operand is a temporary
      Expr::Number(value) => {
        let temp = self.new_temp();
        self.emit(&format!("{temp} = add i32 0, {value}"));
        temp
      }
      Expr::Var(name) => self.load(name),
      Expr::Neg(operand) => {
        let operand_temp = self.gen_expr(operand);
        let temp = self.new_temp();
        self.emit(&format!("{temp} = sub i32 0, {operand_temp}"));
        temp
      }
      Expr::Binary { op, lhs, rhs } => {
        let lhs_temp = self.gen_expr(lhs);
        let rhs_temp = self.gen_expr(rhs);
        let opcode = match op {
          BinaryOp::Add => "add",
          BinaryOp::Sub => "sub",
          BinaryOp::Mul => "mul",
          BinaryOp::Div => "sdiv",
        };
        let temp = self.new_temp();
        self.emit(&format!("{temp} = {opcode} i32 {lhs_temp}, {rhs_temp}"));
        temp
      }
    }
  }
}
