use indoc::formatdoc;
use pretty_assertions::assert_eq;

use super::*;
use crate::cancel::CancellationToken;
use crate::diagnostics::Diagnostics;
use crate::emit::{render, render_type};
use crate::grouping::{self, Grouping};
use crate::host::{CandidateCall, Compilation, MarshallerType};
use crate::marshalling;
use crate::scanner::Scanner;
use crate::test_utils::{CallBuilder, convention, invocation, marshal_as, ty, type_param};

fn grouped(calls: Vec<CandidateCall>, marshallers: Vec<MarshallerType>) -> Grouping {
    let compilation = Compilation {
        calls,
        marshallers,
        sources: Vec::new(),
    };
    let token = CancellationToken::new();
    let mut diagnostics = Diagnostics::new();
    let scanned = Scanner::new("NativeDelegates")
        .scan(&compilation, &mut diagnostics, &token)
        .unwrap();
    let records = marshalling::attach(scanned, &compilation, &mut diagnostics, &token).unwrap();
    grouping::group(&records, &token).unwrap()
}

fn interceptors_text(grouping: &Grouping) -> String {
    render_type(&redirect::interceptors(grouping, &GeneratorOptions::default()).unwrap())
}

#[test]
fn test_implementation_class() {
    let grouping = grouped(vec![CallBuilder::action(&[ty("int")]).build()], Vec::new());
    let class = grouping.implementation(0);
    let text = render_type(&implementation::declaration(class, &GeneratorOptions::default()));
    assert_eq!(
        text,
        formatdoc! {"
            file sealed class {name} : global::NativeDelegates.INativeAction<int>
            {{
                [global::System.Runtime.InteropServices.UnmanagedFunctionPointer(global::System.Runtime.InteropServices.CallingConvention.Winapi)]
                private delegate void Handle(int t1);

                private readonly Handle _handle;
                private readonly nint _functionPointer;

                public {name}(global::System.Action<int> action)
                {{
                    global::System.ArgumentNullException.ThrowIfNull(action);
                    _handle = (Handle)global::System.Delegate.CreateDelegate(typeof(Handle), action.Target, action.Method);
                    _functionPointer = global::System.Runtime.InteropServices.Marshal.GetFunctionPointerForDelegate(_handle);
                }}

                public nint GetFunctionPointer()
                    => _functionPointer;

                [global::System.Runtime.CompilerServices.MethodImpl(global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining)]
                public void Invoke(int t1)
                    => _handle(t1);

                public global::System.Action<int> ToAction()
                    => _handle.Invoke;
            }}
        ", name = class.name}
    );
}

#[test]
fn test_handle_carries_marshalling_overrides() {
    let call = CallBuilder::func(&[ty("string"), ty("int"), ty("bool")])
        .argument("marshalReturnAs", marshal_as(&["UnmanagedType.I1"], &[]))
        .argument(
            "marshalParamsAs",
            crate::test_utils::array(vec![
                marshal_as(&["UnmanagedType.LPStr"], &[]),
                crate::test_utils::null(),
            ]),
        )
        .argument("callingConvention", convention("Cdecl", 2))
        .build();
    let grouping = grouped(vec![call], Vec::new());
    let text = render_type(&implementation::declaration(
        grouping.implementation(0),
        &GeneratorOptions::default(),
    ));
    assert!(text.contains(
        "[global::System.Runtime.InteropServices.UnmanagedFunctionPointer(global::System.Runtime.InteropServices.CallingConvention.Cdecl)]\n    \
         [return: MarshalAs(UnmanagedType.I1)]\n    \
         private delegate bool Handle([MarshalAs(UnmanagedType.LPStr)] string t1, int t2);"
    ));
    assert!(text.contains("public bool Invoke(string t1, int t2)\n        => _handle(t1, t2);"));
    assert!(text.contains("public global::System.Func<string, int, bool> ToFunc()"));
}

#[test]
fn test_function_pointer_class() {
    let call = CallBuilder::action(&[])
        .from_pointer()
        .argument("callingConvention", convention("StdCall", 3))
        .build();
    let grouping = grouped(vec![call], Vec::new());
    let text = render_type(&implementation::declaration(
        grouping.implementation(0),
        &GeneratorOptions::default(),
    ));
    assert!(text.contains(
        "if (functionPtr == 0)\n        {\n            throw new global::System.ArgumentNullException(nameof(functionPtr));\n        }"
    ));
    assert!(text.contains(
        "_handle = global::System.Runtime.InteropServices.Marshal.GetDelegateForFunctionPointer<Handle>(functionPtr);"
    ));
    assert!(text.contains(
        "[global::System.Runtime.InteropServices.UnmanagedCallConv(CallConvs = new[] { typeof(global::System.Runtime.CompilerServices.CallConvStdcall) })]"
    ));
}

#[test]
fn test_closed_redirect() {
    let grouping = grouped(
        vec![
            CallBuilder::action(&[ty("int")]).at("Program.cs", 4, 9).build(),
            CallBuilder::action(&[ty("int")]).at("Other.cs", 12, 17).build(),
        ],
        Vec::new(),
    );
    assert_eq!(grouping.closed.len(), 1);
    let group = &grouping.closed[0];
    let class = grouping.implementation(0);
    assert_eq!(
        interceptors_text(&grouping),
        formatdoc! {r#"
            file static class Interceptors
            {{
                [global::System.Runtime.CompilerServices.InterceptsLocation(@"Program.cs", 4, 9)]
                [global::System.Runtime.CompilerServices.InterceptsLocation(@"Other.cs", 12, 17)]
                public static global::NativeDelegates.INativeAction<int> {method}(global::System.Action<int> action, global::System.Runtime.InteropServices.MarshalAsAttribute?[]? marshalParamsAs, global::System.Runtime.InteropServices.CallingConvention callingConvention)
                    => new {class}(action);
            }}
        "#, method = group.name, class = class.name}
    );
}

#[test]
fn test_runtime_convention_switches_over_fixed_classes() {
    let call = CallBuilder::action(&[])
        .argument("callingConvention", invocation("Interop.PickConvention"))
        .build();
    let grouping = grouped(vec![call], Vec::new());
    assert_eq!(grouping.implementations.len(), 4);
    let names: Vec<&str> = grouping.implementations.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        interceptors_text(&grouping),
        formatdoc! {r#"
            file static class Interceptors
            {{
                [global::System.Runtime.CompilerServices.InterceptsLocation(@"Program.cs", 1, 1)]
                public static global::NativeDelegates.INativeAction {method}(global::System.Action action, global::System.Runtime.InteropServices.CallingConvention callingConvention)
                    => callingConvention switch
                    {{
                        global::System.Runtime.InteropServices.CallingConvention.Cdecl => new {cdecl}(action),
                        global::System.Runtime.InteropServices.CallingConvention.StdCall => new {stdcall}(action),
                        global::System.Runtime.InteropServices.CallingConvention.ThisCall => new {thiscall}(action),
                        global::System.Runtime.InteropServices.CallingConvention.Winapi => new {winapi}(action),
                        _ => throw new global::System.NotSupportedException($"Calling convention {{callingConvention}} is not supported."),
                    }};
            }}
        "#,
            method = grouping.closed[0].name,
            cdecl = names[0],
            stdcall = names[1],
            thiscall = names[2],
            winapi = names[3],
        }
    );
}

fn cdecl_marshaller() -> MarshallerType {
    MarshallerType {
        name: "global::App.CdeclMarshaller".into(),
        members: vec![crate::host::BoundArgument {
            parameter: "callingConvention".into(),
            location: crate::host::SourceLocation::new("Marshallers.cs", 3, 5),
            value: convention("Cdecl", 2),
        }],
    }
}

#[test]
fn test_marshaller_overload_redirect_is_generic() {
    let call = CallBuilder::func(&[ty("int"), ty("bool")])
        .marshaller(ty("global::App.CdeclMarshaller"))
        .build();
    let grouping = grouped(vec![call], vec![cdecl_marshaller()]);
    let text = interceptors_text(&grouping);
    assert!(text.contains(&format!(
        "public static global::NativeDelegates.INativeFunc<T1, TResult> {}<T1, TResult, TMarshaller>(global::System.Func<T1, TResult> func)\n        \
         where TMarshaller : global::NativeDelegates.IMarshaller<TMarshaller>\n        \
         => (global::NativeDelegates.INativeFunc<T1, TResult>)(object)new {}((global::System.Func<int, bool>)(object)func);",
        grouping.closed[0].name,
        grouping.implementation(0).name
    )));
    assert_eq!(
        grouping.implementation(0).key.marshalling.calling_convention,
        Some(CallConvention::Cdecl)
    );
}

#[test]
fn test_marshaller_pointer_redirect_passes_the_address_through() {
    let call = CallBuilder::action(&[])
        .from_pointer()
        .marshaller(ty("global::App.CdeclMarshaller"))
        .build();
    let grouping = grouped(vec![call], vec![cdecl_marshaller()]);
    let text = interceptors_text(&grouping);
    assert!(text.contains(&format!(
        "public static global::NativeDelegates.INativeAction {}<TMarshaller>(nint functionPtr)",
        grouping.closed[0].name
    )));
    assert!(text.contains(&format!(
        "=> (global::NativeDelegates.INativeAction)(object)new {}(functionPtr);",
        grouping.implementation(0).name
    )));
}

#[test]
fn test_closed_and_open_marshaller_sites_share_the_interceptor_shape() {
    let grouping = grouped(
        vec![
            CallBuilder::func(&[ty("int"), ty("bool")])
                .marshaller(ty("global::App.CdeclMarshaller"))
                .at("Program.cs", 4, 9)
                .build(),
            CallBuilder::func(&[type_param("T"), ty("bool")])
                .marshaller(type_param("TM"))
                .at("Generic.cs", 6, 9)
                .instantiation(&[ty("long"), ty("bool")], &[ty("global::App.CdeclMarshaller")])
                .build(),
        ],
        vec![cdecl_marshaller()],
    );
    let options = GeneratorOptions::default();
    let closed = redirect::redirect(&grouping.closed[0], &grouping, &options);
    let dispatcher = dispatch::dispatcher(&grouping.open[0], &grouping, &options);
    let Member::Method(open) = &dispatcher.members[0] else {
        panic!("dispatcher without a method");
    };
    assert_eq!(closed.type_parameters, ["T1", "TResult", "TMarshaller"]);
    assert_eq!(closed.type_parameters, open.type_parameters);
    assert_eq!(closed.parameters, open.parameters);
    assert_eq!(closed.return_type, open.return_type);
}

#[test]
fn test_open_dispatcher() {
    let call = CallBuilder::action(&[type_param("T")])
        .at("Generic.cs", 8, 21)
        .instantiation(&[ty("int")], &[])
        .instantiation(&[ty("string")], &[])
        .build();
    let grouping = grouped(vec![call], Vec::new());
    let entry = &grouping.open[0];
    let text = render_type(&dispatch::dispatcher(entry, &grouping, &GeneratorOptions::default()));
    assert_eq!(
        text,
        formatdoc! {r#"
            file static class {dispatcher}
            {{
                [global::System.Runtime.CompilerServices.InterceptsLocation(@"Generic.cs", 8, 21)]
                public static global::NativeDelegates.INativeAction<T1> FromAction<T1>(global::System.Action<T1> action, global::System.Runtime.InteropServices.MarshalAsAttribute?[]? marshalParamsAs, global::System.Runtime.InteropServices.CallingConvention callingConvention)
                {{
                    if (typeof(T1) == typeof(int))
                    {{
                        return (global::NativeDelegates.INativeAction<T1>)(object)new {int_class}((global::System.Action<int>)(object)action);
                    }}
                    if (typeof(T1) == typeof(string))
                    {{
                        return (global::NativeDelegates.INativeAction<T1>)(object)new {string_class}((global::System.Action<string>)(object)action);
                    }}
                    throw new global::System.NotImplementedException("No generated implementation matches this instantiation of FromAction.");
                }}
            }}
        "#,
            dispatcher = entry.name,
            int_class = grouping.implementation(0).name,
            string_class = grouping.implementation(1).name,
        }
    );
}

#[test]
fn test_open_marshaller_dispatcher_guards_the_marshaller() {
    let call = CallBuilder::func(&[type_param("TResult")])
        .from_pointer()
        .marshaller(type_param("TM"))
        .instantiation(&[ty("int")], &[ty("global::App.Default")])
        .build();
    let grouping = grouped(vec![call], Vec::new());
    let text = render_type(&dispatch::dispatcher(
        &grouping.open[0],
        &grouping,
        &GeneratorOptions::default(),
    ));
    assert!(text.contains(
        "public static global::NativeDelegates.INativeFunc<TResult> FromFunctionPointer<TResult, TMarshaller>(nint functionPtr)\n        \
         where TMarshaller : global::NativeDelegates.IMarshaller<TMarshaller>"
    ));
    assert!(text.contains(
        "if (typeof(TResult) == typeof(int) && typeof(TMarshaller) == typeof(global::App.Default))"
    ));
    assert!(text.contains(&format!(
        "return (global::NativeDelegates.INativeFunc<TResult>)(object)new {}(functionPtr);",
        grouping.implementation(0).name
    )));
}

#[test]
fn test_unit_layout() {
    let grouping = grouped(
        vec![
            CallBuilder::action(&[ty("int")]).build(),
            CallBuilder::action(&[type_param("T")])
                .at("Generic.cs", 2, 2)
                .instantiation(&[ty("long")], &[])
                .build(),
        ],
        Vec::new(),
    );
    let unit = build_unit(&grouping, &GeneratorOptions::default());
    assert_eq!(unit.namespaces.len(), 2);
    assert_eq!(unit.namespaces[0].name, "System.Runtime.CompilerServices");
    let generated = &unit.namespaces[1];
    assert_eq!(generated.name, "NativeDelegates.Generated");
    let names: Vec<&str> = generated.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Interceptors",
            grouping.implementation(0).name.as_str(),
            grouping.implementation(1).name.as_str(),
            grouping.open[0].name.as_str(),
        ]
    );

    let text = render(&unit);
    assert!(text.starts_with(
        "// <auto-generated/>\n#nullable enable\n#pragma warning disable CS1591\n\nusing System.Runtime.InteropServices;\n\n"
    ));
    assert!(text.contains("file sealed class InterceptsLocationAttribute : global::System.Attribute"));
}

#[test]
fn test_empty_pass_without_attribute() {
    let options = GeneratorOptions {
        emit_intercepts_attribute: false,
        ..GeneratorOptions::default()
    };
    let unit = build_unit(&Grouping::default(), &options);
    assert!(unit.namespaces.is_empty());
}

#[test]
fn test_intercepts_location_escapes_quotes() {
    let location = crate::host::SourceLocation::new(r#"C:\src\"odd".cs"#, 3, 4);
    assert_eq!(
        intercepts_location(&location),
        r#"global::System.Runtime.CompilerServices.InterceptsLocation(@"C:\src\""odd"".cs", 3, 4)"#
    );
}
